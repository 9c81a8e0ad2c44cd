pub mod debug_overlay;

pub use debug_overlay::{DebugOverlay, OverlayKind, OverlayRect, OverlayStats};
