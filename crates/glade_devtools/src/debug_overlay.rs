//! Diagnostic overlay drawn on top of the game scene.
//!
//! The overlay knows nothing about tiles or obstacles. Gameplay code hands it
//! a list of world-space rectangles with a [`OverlayKind`]; the overlay picks
//! the colours and draws them through the camera when visible.

use glade_render::{Camera2D, Canvas, Rgba};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Collision is active here.
    Blocking,
    /// Collision was switched off for this tile.
    Passable,
    /// The player's collision body.
    Body,
}

impl OverlayKind {
    fn fill(self) -> Rgba {
        match self {
            Self::Blocking => [230, 40, 40, 90],
            Self::Passable => [40, 210, 60, 90],
            Self::Body => [60, 140, 255, 70],
        }
    }

    fn outline(self) -> Rgba {
        match self {
            Self::Blocking => [255, 60, 60, 220],
            Self::Passable => [60, 255, 90, 220],
            Self::Body => [90, 170, 255, 230],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub min: Vec2,
    pub max: Vec2,
    pub kind: OverlayKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub blocking: usize,
    pub passable: usize,
}

pub struct DebugOverlay {
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            log::info!("Debug overlay: {}", if visible { "ON" } else { "OFF" });
        }
    }

    pub fn draw(&self, canvas: &mut Canvas<'_>, camera: &Camera2D, rects: &[OverlayRect]) -> OverlayStats {
        let mut stats = OverlayStats::default();
        if !self.visible {
            return stats;
        }
        for rect in rects {
            canvas.fill_world_rect(camera, rect.min, rect.max, rect.kind.fill());
            canvas.stroke_world_rect(camera, rect.min, rect.max, rect.kind.outline());
            match rect.kind {
                OverlayKind::Blocking => stats.blocking += 1,
                OverlayKind::Passable => stats.passable += 1,
                OverlayKind::Body => {}
            }
        }
        stats
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new()
    }
}
