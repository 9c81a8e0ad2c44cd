use glam::Vec2;

/// World space is y-down with the origin at the map's top-left corner, the
/// same convention as the tile grid. `position` is the world point shown at
/// the viewport centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.zoom + self.viewport_size() * 0.5
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.viewport_size() * 0.5) / self.zoom + self.position
    }

    /// World-space `(min, max)` corners currently visible.
    pub fn visible_bounds(&self) -> (Vec2, Vec2) {
        let half = self.viewport_size() * 0.5 / self.zoom;
        (self.position - half, self.position + half)
    }
}
