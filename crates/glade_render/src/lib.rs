pub mod camera;
pub mod canvas;
pub mod surface;
pub mod texture;

pub use camera::Camera2D;
pub use canvas::{Canvas, Rgba, SrcRect};
pub use surface::FrameSurface;
pub use texture::load_rgba;
