//! Two-phase camera: a fitted overview of the whole map, then smoothed
//! tracking of the player once the intro timer fires.

use glam::Vec2;

use glade_core::events::Scheduler;
use glade_render::Camera2D;

use crate::config::CameraConfig;
use crate::session::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPhase {
    /// Not started yet.
    Idle,
    Overview,
    Follow,
}

pub struct CameraDirector {
    config: CameraConfig,
    phase: CameraPhase,
}

impl CameraDirector {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            phase: CameraPhase::Idle,
        }
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    /// Fit the map in the viewport and arm the follow timer. Only the first
    /// call has any effect.
    pub fn start(&mut self, camera: &mut Camera2D, map_size: Vec2, scheduler: &mut Scheduler<GameEvent>) {
        if self.phase != CameraPhase::Idle {
            return;
        }
        camera.zoom = overview_zoom(camera.viewport_size(), map_size, self.config.intro_zoom_factor);
        camera.position = map_size * 0.5;
        scheduler.schedule_in(self.config.follow_delay_ms * 1000, GameEvent::BeginFollow);
        self.phase = CameraPhase::Overview;
        log::info!(
            "Camera overview: zoom {:.3}, follow in {} ms",
            camera.zoom,
            self.config.follow_delay_ms
        );
    }

    pub fn on_event(&mut self, event: &GameEvent, camera: &mut Camera2D) {
        if *event == GameEvent::BeginFollow && self.phase == CameraPhase::Overview {
            self.phase = CameraPhase::Follow;
            camera.zoom = self.config.follow_zoom;
            log::info!("Camera following player at zoom {}", camera.zoom);
        }
    }

    /// Move toward `target` by the lerp factor. Only in the follow phase.
    pub fn update(&self, camera: &mut Camera2D, target: Vec2) {
        if self.phase == CameraPhase::Follow {
            camera.position += (target - camera.position) * self.config.follow_lerp;
        }
    }
}

/// Largest zoom that shows the whole map, scaled by `factor`.
pub fn overview_zoom(viewport: Vec2, map_size: Vec2, factor: f32) -> f32 {
    if map_size.x <= 0.0 || map_size.y <= 0.0 {
        return factor;
    }
    (viewport.x / map_size.x).min(viewport.y / map_size.y) * factor
}
