use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use winit::window::Window;

use crate::canvas::Canvas;

/// Window-backed RGBA framebuffer. The frame is the same size as the
/// window's inner size, so one canvas pixel is one screen pixel.
pub struct FrameSurface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    size: (u32, u32),
}

impl FrameSurface {
    pub fn new(window: Arc<Window>) -> Result<Self, String> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            size: (size.width, size.height),
        })
    }

    fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, String> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface).map_err(|e| format!("Failed to create pixel surface: {e}"))
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.size = (width, height);
        Ok(())
    }

    pub fn canvas(&mut self) -> Option<Canvas<'_>> {
        let (width, height) = self.size;
        Canvas::new(self.pixels.frame_mut(), width, height)
    }

    pub fn present(&mut self) -> Result<(), String> {
        self.pixels
            .render()
            .map_err(|e| format!("Failed to present frame: {e}"))
    }
}
