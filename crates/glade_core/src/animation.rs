//! Frame-range sprite animation types and deterministic playback.
//!
//! A clip is a contiguous range of frames on one horizontal sprite strip,
//! played at a fixed frame rate. All timing uses integer microseconds (`u64`)
//! so advancement under the fixed-timestep model is identical on every
//! platform.
//!
//! The JSON catalog stores `frame_rate` in frames per second for readability;
//! on load this becomes a per-frame `frame_duration_us`.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// A horizontal strip of equally sized frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheet {
    pub image: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
}

impl SpriteSheet {
    /// Source pixel rect `(x, y, w, h)` of `frame` within the strip.
    pub fn frame_rect(&self, frame: u32) -> (u32, u32, u32, u32) {
        (frame * self.frame_width, 0, self.frame_width, self.frame_height)
    }
}

/// A named frame range over one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationClip {
    pub name: String,
    pub sheet: String,
    pub start_frame: u32,
    pub end_frame: u32,
    pub frame_duration_us: u64,
    pub looping: bool,
}

impl AnimationClip {
    pub fn frame_count(&self) -> u32 {
        self.end_frame - self.start_frame + 1
    }

    /// Duration of one full pass through the range.
    pub fn total_duration_us(&self) -> u64 {
        self.frame_duration_us * u64::from(self.frame_count())
    }
}

/// Every sheet and clip the game knows about.
#[derive(Debug, Clone, Default)]
pub struct AnimationCatalog {
    pub sheets: BTreeMap<String, SpriteSheet>,
    pub clips: BTreeMap<String, AnimationClip>,
}

impl AnimationCatalog {
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    pub fn sheet_for(&self, clip: &AnimationClip) -> Option<&SpriteSheet> {
        self.sheets.get(&clip.sheet)
    }

    pub fn register_sheet(&mut self, name: &str, sheet: SpriteSheet) {
        self.sheets.insert(name.to_string(), sheet);
    }

    pub fn register_clip(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }
}

/// Emitted once when a non-looping clip reaches its final frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationComplete {
    pub clip_name: String,
}

/// Runtime playback state for one animated sprite.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip_name: Option<String>,
    pub frame_index: u32,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self {
            clip_name: None,
            frame_index: 0,
            elapsed_us: 0,
            finished: false,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.clip_name.as_deref()
    }

    /// Start `name` from its first frame. Returns false when it is already
    /// playing, in which case playback continues untouched. A finished
    /// once-clip restarts.
    pub fn play(&mut self, name: &str) -> bool {
        if self.clip_name.as_deref() == Some(name) && !self.finished {
            return false;
        }
        self.clip_name = Some(name.to_string());
        self.frame_index = 0;
        self.elapsed_us = 0;
        self.finished = false;
        true
    }

    /// Absolute frame on the sheet for the current playback position.
    pub fn sheet_frame(&self, clip: &AnimationClip) -> u32 {
        clip.start_frame + self.frame_index.min(clip.frame_count() - 1)
    }

    /// Advance by `dt_us`. Integer arithmetic only.
    pub fn tick(&mut self, dt_us: u64, clip: &AnimationClip) -> Option<AnimationComplete> {
        if self.finished || clip.frame_duration_us == 0 {
            return None;
        }

        self.elapsed_us += dt_us;
        let frame_count = clip.frame_count();

        while self.elapsed_us >= clip.frame_duration_us {
            if !clip.looping && self.frame_index + 1 >= frame_count {
                self.elapsed_us = 0;
                self.finished = true;
                return Some(AnimationComplete {
                    clip_name: clip.name.clone(),
                });
            }
            self.elapsed_us -= clip.frame_duration_us;
            self.frame_index = (self.frame_index + 1) % frame_count;
        }

        None
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct CatalogJson {
    version: String,
    sheets: BTreeMap<String, SheetJson>,
    clips: BTreeMap<String, ClipJson>,
}

#[derive(Debug, Deserialize)]
struct SheetJson {
    image: String,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
}

#[derive(Debug, Deserialize)]
struct ClipJson {
    sheet: String,
    #[serde(default)]
    start: u32,
    end: u32,
    frame_rate: u32,
    #[serde(default)]
    looping: bool,
}

/// Load an animation catalog from disk.
pub fn load_animation_catalog(path: &Path) -> Result<AnimationCatalog, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation catalog {}: {e}", path.display()))?;
    parse_animation_catalog(&raw)
        .map_err(|e| format!("Animation catalog {}: {e}", path.display()))
}

pub fn parse_animation_catalog(raw: &str) -> Result<AnimationCatalog, String> {
    let json: CatalogJson =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse catalog JSON: {e}"))?;
    validate_catalog_json(&json)?;

    let mut catalog = AnimationCatalog::default();
    for (name, sheet) in json.sheets {
        catalog.register_sheet(
            &name,
            SpriteSheet {
                image: sheet.image,
                frame_width: sheet.frame_width,
                frame_height: sheet.frame_height,
                frame_count: sheet.frame_count,
            },
        );
    }
    for (name, clip) in json.clips {
        catalog.register_clip(AnimationClip {
            name,
            sheet: clip.sheet,
            start_frame: clip.start,
            end_frame: clip.end,
            frame_duration_us: 1_000_000 / u64::from(clip.frame_rate),
            looping: clip.looping,
        });
    }
    Ok(catalog)
}

fn validate_catalog_json(json: &CatalogJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    let mut images = HashSet::new();
    for (name, sheet) in &json.sheets {
        if sheet.frame_width == 0 || sheet.frame_height == 0 || sheet.frame_count == 0 {
            return Err(format!(
                "Animation validation failed: sheet '{}' has zero-sized frames",
                name
            ));
        }
        if !images.insert(sheet.image.as_str()) {
            log::warn!(
                "Sheets share image '{}'. This is allowed but often accidental.",
                sheet.image
            );
        }
    }
    for (name, clip) in &json.clips {
        if name.is_empty() {
            return Err("Animation validation failed: clip name is empty".to_string());
        }
        let Some(sheet) = json.sheets.get(&clip.sheet) else {
            return Err(format!(
                "Animation validation failed: clip '{}' references unknown sheet '{}'",
                name, clip.sheet
            ));
        };
        if clip.start > clip.end || clip.end >= sheet.frame_count {
            return Err(format!(
                "Animation validation failed: clip '{}' frame range {}..={} outside sheet '{}' ({} frames)",
                name, clip.start, clip.end, clip.sheet, sheet.frame_count
            ));
        }
        if clip.frame_rate == 0 {
            return Err(format!(
                "Animation validation failed: clip '{}' has zero frame rate",
                name
            ));
        }
    }
    Ok(())
}
