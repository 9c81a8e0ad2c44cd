//! CPU drawing into an RGBA8 frame.
//!
//! Everything is drawn in screen pixels with nearest-neighbour sampling and
//! straight-alpha blending. The `*_world` helpers run world rectangles
//! through a [`Camera2D`] first.

use glam::Vec2;
use image::RgbaImage;

use crate::camera::Camera2D;

pub type Rgba = [u8; 4];

/// Source rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrcRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// `frame` must hold exactly `width * height * 4` bytes.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        if frame.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.frame[i],
            self.frame[i + 1],
            self.frame[i + 2],
            self.frame[i + 3],
        ])
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        let alpha = u32::from(color[3]);
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.frame[i..i + 4].copy_from_slice(&color);
            return;
        }
        for c in 0..3 {
            let dst = u32::from(self.frame[i + c]);
            let src = u32::from(color[c]);
            self.frame[i + c] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        self.frame[i + 3] = 255;
    }

    /// Pixel span `[start, end)` covered by a float edge pair, clipped.
    fn span(lo: f32, hi: f32, limit: u32) -> (i32, i32) {
        let start = lo.round().max(0.0) as i32;
        let end = hi.round().min(limit as f32) as i32;
        (start, end)
    }

    pub fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba) {
        let (x0, x1) = Self::span(min.x, max.x, self.width);
        let (y0, y1) = Self::span(min.y, max.y, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, min: Vec2, max: Vec2, color: Rgba) {
        let (x0, x1) = (min.x.round() as i32, max.x.round() as i32 - 1);
        let (y0, y1) = (min.y.round() as i32, max.y.round() as i32 - 1);
        if x1 < x0 || y1 < y0 {
            return;
        }
        for x in x0..=x1 {
            self.blend(x, y0, color);
            if y1 != y0 {
                self.blend(x, y1, color);
            }
        }
        for y in (y0 + 1)..y1 {
            self.blend(x0, y, color);
            if x1 != x0 {
                self.blend(x1, y, color);
            }
        }
    }

    /// Stretch `src` of `image` onto the screen rectangle `[min, max)`.
    pub fn blit(&mut self, image: &RgbaImage, src: SrcRect, min: Vec2, max: Vec2, flip_x: bool) {
        let dst_w = max.x - min.x;
        let dst_h = max.y - min.y;
        if dst_w <= 0.0 || dst_h <= 0.0 || src.w == 0 || src.h == 0 {
            return;
        }
        if src.x + src.w > image.width() || src.y + src.h > image.height() {
            log::warn!(
                "Blit source {:?} exceeds image bounds {}x{}",
                src,
                image.width(),
                image.height()
            );
            return;
        }

        let (x0, x1) = Self::span(min.x, max.x, self.width);
        let (y0, y1) = Self::span(min.y, max.y, self.height);
        for y in y0..y1 {
            let v = ((y as f32 + 0.5 - min.y) / dst_h * src.h as f32).floor() as i64;
            let sy = v.clamp(0, i64::from(src.h) - 1) as u32;
            for x in x0..x1 {
                let u = ((x as f32 + 0.5 - min.x) / dst_w * src.w as f32).floor() as i64;
                let mut sx = u.clamp(0, i64::from(src.w) - 1) as u32;
                if flip_x {
                    sx = src.w - 1 - sx;
                }
                let texel = image.get_pixel(src.x + sx, src.y + sy).0;
                self.blend(x, y, texel);
            }
        }
    }

    pub fn fill_world_rect(&mut self, camera: &Camera2D, min: Vec2, max: Vec2, color: Rgba) {
        self.fill_rect(
            camera.world_to_screen(min),
            camera.world_to_screen(max),
            color,
        );
    }

    pub fn stroke_world_rect(&mut self, camera: &Camera2D, min: Vec2, max: Vec2, color: Rgba) {
        self.stroke_rect(
            camera.world_to_screen(min),
            camera.world_to_screen(max),
            color,
        );
    }

    pub fn blit_world(
        &mut self,
        camera: &Camera2D,
        image: &RgbaImage,
        src: SrcRect,
        min: Vec2,
        max: Vec2,
        flip_x: bool,
    ) {
        self.blit(
            image,
            src,
            camera.world_to_screen(min),
            camera.world_to_screen(max),
            flip_x,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba as ImageRgba;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    #[test]
    fn new_rejects_mismatched_frame() {
        let mut frame = vec![0u8; 10];
        assert!(Canvas::new(&mut frame, 2, 2).is_none());
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4).expect("frame size");
        canvas.fill_rect(Vec2::new(-2.0, -2.0), Vec2::new(2.0, 2.0), RED);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn half_alpha_blends_with_background() {
        let mut frame = vec![0u8; 4];
        let mut canvas = Canvas::new(&mut frame, 1, 1).expect("frame size");
        canvas.clear([0, 0, 0, 255]);
        canvas.fill_rect(Vec2::ZERO, Vec2::ONE, [255, 255, 255, 128]);
        let px = canvas.pixel(0, 0).expect("pixel");
        assert_eq!(px[0], 128);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn stroke_rect_leaves_interior_untouched() {
        let mut frame = vec![0u8; 5 * 5 * 4];
        let mut canvas = Canvas::new(&mut frame, 5, 5).expect("frame size");
        canvas.stroke_rect(Vec2::ZERO, Vec2::new(5.0, 5.0), BLUE);
        assert_eq!(canvas.pixel(0, 0), Some(BLUE));
        assert_eq!(canvas.pixel(4, 4), Some(BLUE));
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn blit_scales_and_flips() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, ImageRgba(RED));
        image.put_pixel(1, 0, ImageRgba(BLUE));
        let src = SrcRect { x: 0, y: 0, w: 2, h: 1 };

        let mut frame = vec![0u8; 4 * 2 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 2).expect("frame size");
        canvas.blit(&image, src, Vec2::ZERO, Vec2::new(4.0, 2.0), false);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(3, 0), Some(BLUE));

        canvas.blit(&image, src, Vec2::ZERO, Vec2::new(4.0, 2.0), true);
        assert_eq!(canvas.pixel(0, 0), Some(BLUE));
        assert_eq!(canvas.pixel(3, 1), Some(RED));
    }

    #[test]
    fn blit_skips_transparent_texels() {
        let image = RgbaImage::new(1, 1);
        let mut frame = vec![0u8; 4];
        let mut canvas = Canvas::new(&mut frame, 1, 1).expect("frame size");
        canvas.clear(RED);
        canvas.blit(
            &image,
            SrcRect { x: 0, y: 0, w: 1, h: 1 },
            Vec2::ZERO,
            Vec2::ONE,
            false,
        );
        assert_eq!(canvas.pixel(0, 0), Some(RED));
    }

    #[test]
    fn world_rect_goes_through_camera() {
        let mut frame = vec![0u8; 10 * 10 * 4];
        let mut canvas = Canvas::new(&mut frame, 10, 10).expect("frame size");
        let mut camera = Camera2D::new(10, 10);
        camera.position = Vec2::new(5.0, 5.0);
        camera.zoom = 2.0;
        canvas.fill_world_rect(&camera, Vec2::new(5.0, 5.0), Vec2::new(6.0, 6.0), RED);
        assert_eq!(canvas.pixel(5, 5), Some(RED));
        assert_eq!(canvas.pixel(6, 6), Some(RED));
        assert_eq!(canvas.pixel(7, 7), Some([0, 0, 0, 0]));
    }
}
