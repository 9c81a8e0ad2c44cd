//! Deferred work for the fixed-step loop.
//!
//! Anything that completes "later" (an animation reaching its last frame, a
//! delayed timer) is turned into an event and pushed onto an [`EventQueue`].
//! The simulation drains the queue at one known point per step, so no
//! callback ever runs in the middle of another subsystem's update.

use std::collections::VecDeque;

/// FIFO of pending events.
#[derive(Debug)]
pub struct EventQueue<E> {
    pending: VecDeque<E>,
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: E) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take everything queued so far. Events pushed while handling the
    /// returned batch wait for the next drain.
    pub fn drain(&mut self) -> Vec<E> {
        self.pending.drain(..).collect()
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct ScheduledTimer<E> {
    fire_at_us: u64,
    seq: u64,
    event: E,
}

/// One-shot timers measured in simulation microseconds.
///
/// Timers fire once, in deadline order (ties in scheduling order), and are
/// then forgotten.
#[derive(Debug)]
pub struct Scheduler<E> {
    now_us: u64,
    next_seq: u64,
    timers: Vec<ScheduledTimer<E>>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_us: 0,
            next_seq: 0,
            timers: Vec::new(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Schedule `event` to fire `delay_us` after the current time.
    pub fn schedule_in(&mut self, delay_us: u64, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(ScheduledTimer {
            fire_at_us: self.now_us.saturating_add(delay_us),
            seq,
            event,
        });
    }

    /// Move time forward and push every timer that came due onto `queue`.
    pub fn advance(&mut self, dt_us: u64, queue: &mut EventQueue<E>) {
        self.now_us = self.now_us.saturating_add(dt_us);
        if self.timers.iter().all(|t| t.fire_at_us > self.now_us) {
            return;
        }

        let now = self.now_us;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.fire_at_us <= now);
        self.timers = waiting;
        due.sort_by_key(|t| (t.fire_at_us, t.seq));
        for timer in due {
            queue.push(timer.event);
        }
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
