//! Fixed-step frame clock.
//!
//! Wall-clock time feeds an accumulator; the simulation consumes it in equal
//! `fixed_dt_us` slices. Simulation time (`sim_time_us`) only ever advances
//! by whole steps, which is what timers and animations are measured against.

use std::time::Instant;

const DEFAULT_FIXED_DT_US: u64 = 16_667;
const DEFAULT_MAX_FRAME_US: u64 = 250_000;

pub struct FrameClock {
    pub fixed_dt_us: u64,
    /// Longest wall-clock frame fed into the accumulator (spiral-of-death cap).
    pub max_frame_us: u64,
    accumulator_us: u64,
    pub sim_time_us: u64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    last_instant: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_step(DEFAULT_FIXED_DT_US)
    }

    pub fn with_step(fixed_dt_us: u64) -> Self {
        Self {
            fixed_dt_us: fixed_dt_us.max(1),
            max_frame_us: DEFAULT_MAX_FRAME_US,
            accumulator_us: 0,
            sim_time_us: 0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            last_instant: None,
        }
    }

    /// Measure the wall-clock delta since the previous frame and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt_us = match self.last_instant {
            Some(last) => now.duration_since(last).as_micros() as u64,
            None => 0,
        };
        self.last_instant = Some(now);
        self.advance(real_dt_us);
    }

    /// Feed an explicit delta. Used by `begin_frame` and by headless runs.
    pub fn advance(&mut self, real_dt_us: u64) {
        let mut dt_us = real_dt_us;
        if dt_us > self.max_frame_us {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                dt_us as f64 / 1000.0,
                self.max_frame_us / 1000
            );
            dt_us = self.max_frame_us;
        }
        self.accumulator_us += dt_us;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator_us >= self.fixed_dt_us {
            self.accumulator_us -= self.fixed_dt_us;
            self.sim_time_us += self.fixed_dt_us;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn fixed_dt_secs(&self) -> f32 {
        self.fixed_dt_us as f32 / 1_000_000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
