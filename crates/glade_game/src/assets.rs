//! Decoded images the renderer draws from.

use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;

use glade_core::animation::AnimationCatalog;

use crate::tilemap::{resolve_tilesets, TileMap, TilesetImages};

/// Player sprite strips keyed by sheet name.
#[derive(Default)]
pub struct SpriteStrips {
    strips: HashMap<String, RgbaImage>,
}

impl SpriteStrips {
    /// Decode every sheet in `catalog` from `dir`. Any strip that fails to
    /// load, or is too small for its frames, fails the whole load.
    pub fn load(catalog: &AnimationCatalog, dir: &Path) -> Result<Self, String> {
        let mut strips = Self::default();
        for (name, sheet) in &catalog.sheets {
            let path = dir.join(&sheet.image);
            let image = glade_render::load_rgba(&path)
                .map_err(|e| format!("Sprite strip '{name}': {e}"))?;
            let needed = sheet.frame_width * sheet.frame_count;
            if image.width() < needed || image.height() < sheet.frame_height {
                return Err(format!(
                    "Sprite strip '{}' is {}x{}, needs at least {}x{}",
                    name,
                    image.width(),
                    image.height(),
                    needed,
                    sheet.frame_height
                ));
            }
            strips.insert(name, image);
        }
        log::info!("Sprite strips loaded: {}", strips.strips.len());
        Ok(strips)
    }

    pub fn insert(&mut self, sheet: &str, image: RgbaImage) {
        self.strips.insert(sheet.to_string(), image);
    }

    pub fn get(&self, sheet: &str) -> Option<&RgbaImage> {
        self.strips.get(sheet)
    }
}

pub struct SceneAssets {
    pub tilesets: TilesetImages,
    pub sprites: SpriteStrips,
}

impl SceneAssets {
    /// Tileset images are resolved next to `map_path`. Any image that fails
    /// to load is an error.
    pub fn load(
        map: &TileMap,
        map_path: &Path,
        catalog: &AnimationCatalog,
        sprite_dir: &Path,
    ) -> Result<Self, String> {
        let base_dir = map_path.parent().unwrap_or_else(|| Path::new("."));
        let tilesets = resolve_tilesets(map, base_dir)?;
        let sprites = SpriteStrips::load(catalog, sprite_dir)?;
        Ok(Self { tilesets, sprites })
    }
}
