//! The player's animation catalog.
//!
//! Four clips on four horizontal strips. A JSON catalog may replace the
//! built-in one, but it must still define every clip the controller asks for.

use std::path::Path;

use glade_core::animation::{load_animation_catalog, AnimationCatalog, AnimationClip, SpriteSheet};

pub const CLIP_IDLE: &str = "idle";
pub const CLIP_RUN: &str = "run";
pub const CLIP_ATTACK: &str = "attack";
pub const CLIP_HURT: &str = "hurt";

pub const REQUIRED_CLIPS: [&str; 4] = [CLIP_IDLE, CLIP_RUN, CLIP_ATTACK, CLIP_HURT];

pub const FRAME_SIZE: u32 = 48;

/// `(clip, strip image, frames, fps, looping)`
const BUILTIN: [(&str, &str, u32, u32, bool); 4] = [
    (CLIP_IDLE, "idle.png", 10, 10, true),
    (CLIP_RUN, "run.png", 16, 20, true),
    (CLIP_ATTACK, "attack.png", 7, 14, false),
    (CLIP_HURT, "hurt.png", 4, 8, false),
];

pub fn builtin_catalog() -> AnimationCatalog {
    let mut catalog = AnimationCatalog::default();
    for (name, image, frames, fps, looping) in BUILTIN {
        catalog.register_sheet(
            name,
            SpriteSheet {
                image: image.to_string(),
                frame_width: FRAME_SIZE,
                frame_height: FRAME_SIZE,
                frame_count: frames,
            },
        );
        catalog.register_clip(AnimationClip {
            name: name.to_string(),
            sheet: name.to_string(),
            start_frame: 0,
            end_frame: frames - 1,
            frame_duration_us: 1_000_000 / u64::from(fps),
            looping,
        });
    }
    catalog
}

/// Load the catalog at `path`, or the built-in one when no path is set.
pub fn load_player_catalog(path: Option<&Path>) -> Result<AnimationCatalog, String> {
    let catalog = match path {
        Some(path) => {
            let catalog = load_animation_catalog(path)?;
            log::info!(
                "Animation catalog loaded: {} ({} clips)",
                path.display(),
                catalog.clips.len()
            );
            catalog
        }
        None => builtin_catalog(),
    };
    validate_required_clips(&catalog)?;
    Ok(catalog)
}

fn validate_required_clips(catalog: &AnimationCatalog) -> Result<(), String> {
    for name in REQUIRED_CLIPS {
        if catalog.clip(name).is_none() {
            return Err(format!(
                "Animation catalog validation failed: missing clip '{name}'"
            ));
        }
    }
    // Attacking and Hurting end only on a completion event.
    for name in [CLIP_ATTACK, CLIP_HURT] {
        if catalog.clip(name).is_some_and(|clip| clip.looping) {
            return Err(format!(
                "Animation catalog validation failed: clip '{name}' must not loop"
            ));
        }
    }
    Ok(())
}
