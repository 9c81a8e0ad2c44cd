//! Tile-grid map loading (Tiled JSON, orthogonal, uncompressed layers).
//!
//! The map is immutable once loaded. Layers are addressed by name; the game
//! draws `Ground, Fences, Trees, Logs, Bridges` in that order and builds
//! obstacles from `Trees` and `Fences`. A missing expected layer is logged and
//! skipped so the game still runs with whatever did load.
//!
//! Tile values are Tiled global ids with the flip flags masked off. Index 0 is
//! an empty cell.

use glam::Vec2;
use image::RgbaImage;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use glade_render::SrcRect;

pub const LAYER_GROUND: &str = "Ground";
pub const LAYER_FENCES: &str = "Fences";
pub const LAYER_TREES: &str = "Trees";
pub const LAYER_LOGS: &str = "Logs";
pub const LAYER_BRIDGES: &str = "Bridges";

/// Fixed back-to-front draw order.
pub const DRAW_ORDER: [&str; 5] = [
    LAYER_GROUND,
    LAYER_FENCES,
    LAYER_TREES,
    LAYER_LOGS,
    LAYER_BRIDGES,
];

/// Layers whose non-empty tiles become obstacles.
pub const OBSTACLE_LAYERS: [&str; 2] = [LAYER_TREES, LAYER_FENCES];

const GID_FLIP_MASK: u32 = 0xE000_0000;

/// Grid position of a tile. Orders row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub y: u32,
    pub x: u32,
}

impl TileKey {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for TileKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("tile key '{s}' is not of the form x,y"))?;
        let x = x
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("tile key '{s}' has invalid x: {e}"))?;
        let y = y
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("tile key '{s}' has invalid y: {e}"))?;
        Ok(Self { x, y })
    }
}

/// One non-empty cell of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile<'a> {
    pub layer: &'a str,
    pub key: TileKey,
    pub index: u32,
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    data: Vec<u32>,
}

impl TileLayer {
    pub fn index_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.width + x) as usize).copied()
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile<'_>> {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &index)| index > 0)
            .map(move |(i, &index)| Tile {
                layer: self.name.as_str(),
                key: TileKey::new(i as u32 % width, i as u32 / width),
                index,
            })
    }
}

#[derive(Debug, Clone)]
pub struct Tileset {
    pub name: String,
    pub first_gid: u32,
    /// Image path relative to the map file. `None` for external tilesets.
    pub image: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tile_count: u32,
    pub margin: u32,
    pub spacing: u32,
}

impl Tileset {
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tile_count
    }

    /// Source rectangle of `gid` inside this tileset's image.
    pub fn locate(&self, gid: u32) -> Option<SrcRect> {
        if !self.contains(gid) || self.columns == 0 {
            return None;
        }
        let local = gid - self.first_gid;
        let col = local % self.columns;
        let row = local / self.columns;
        Some(SrcRect {
            x: self.margin + col * (self.tile_width + self.spacing),
            y: self.margin + row * (self.tile_height + self.spacing),
            w: self.tile_width,
            h: self.tile_height,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TileMap {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    layers: Vec<TileLayer>,
    /// Sorted by `first_gid`.
    pub tilesets: Vec<Tileset>,
}

impl TileMap {
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Tile index at `(x, y)` on `layer`; `Some(0)` for an empty in-bounds cell.
    pub fn tile_at(&self, layer: &str, x: u32, y: u32) -> Option<u32> {
        self.layer(layer)?.index_at(x, y)
    }

    /// Non-empty tiles of `layer`, row-major. Empty when the layer is missing.
    pub fn tiles<'a>(&'a self, layer: &str) -> impl Iterator<Item = Tile<'a>> + 'a {
        self.layer(layer).into_iter().flat_map(TileLayer::tiles)
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            (self.width * self.tile_width) as f32,
            (self.height * self.tile_height) as f32,
        )
    }

    pub fn tile_size(&self) -> Vec2 {
        Vec2::new(self.tile_width as f32, self.tile_height as f32)
    }

    /// Grid cell under a world point, if inside the map.
    pub fn key_at_world(&self, point: Vec2) -> Option<TileKey> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let x = (point.x / self.tile_width as f32).floor() as u32;
        let y = (point.y / self.tile_height as f32).floor() as u32;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(TileKey::new(x, y))
    }

    /// Non-empty tile of `layer` under a world point.
    pub fn tile_at_world(&self, layer: &str, point: Vec2) -> Option<Tile<'_>> {
        let key = self.key_at_world(point)?;
        let layer = self.layer(layer)?;
        let index = layer.index_at(key.x, key.y)?;
        (index > 0).then_some(Tile {
            layer: layer.name.as_str(),
            key,
            index,
        })
    }

    /// World-space `(min, max)` footprint of a cell.
    pub fn tile_bounds(&self, key: TileKey) -> (Vec2, Vec2) {
        let size = self.tile_size();
        let min = Vec2::new(key.x as f32, key.y as f32) * size;
        (min, min + size)
    }

    /// Expected layers that exist, in draw order.
    pub fn ordered_layers(&self) -> Vec<&TileLayer> {
        DRAW_ORDER
            .iter()
            .filter_map(|name| self.layer(name))
            .collect()
    }

    pub fn tileset_for(&self, gid: u32) -> Option<&Tileset> {
        self.tilesets
            .iter()
            .rev()
            .find(|ts| ts.first_gid <= gid)
            .filter(|ts| ts.contains(gid))
    }
}

/// Decoded tileset images keyed by tileset name.
#[derive(Default)]
pub struct TilesetImages {
    images: HashMap<String, RgbaImage>,
}

impl TilesetImages {
    pub fn insert(&mut self, tileset: &str, image: RgbaImage) {
        self.images.insert(tileset.to_string(), image);
    }

    pub fn get(&self, tileset: &str) -> Option<&RgbaImage> {
        self.images.get(tileset)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Decode every tileset image, resolving paths against `base_dir`.
///
/// Tilesets without an embedded image are skipped with a warning. A declared
/// image that fails to load is fatal, as is a map with no image at all.
pub fn resolve_tilesets(map: &TileMap, base_dir: &Path) -> Result<TilesetImages, String> {
    let mut images = TilesetImages::default();
    for tileset in &map.tilesets {
        let Some(image) = &tileset.image else {
            log::warn!(
                "Tileset '{}' is external or has no image; skipping",
                tileset.name
            );
            continue;
        };
        let path = base_dir.join(image);
        match glade_render::load_rgba(&path) {
            Ok(decoded) => {
                if decoded.width() < tileset.image_width || decoded.height() < tileset.image_height {
                    log::warn!(
                        "Tileset '{}' image is {}x{}, map declares {}x{}",
                        tileset.name,
                        decoded.width(),
                        decoded.height(),
                        tileset.image_width,
                        tileset.image_height
                    );
                }
                images.insert(&tileset.name, decoded);
            }
            Err(err) => return Err(format!("Tileset '{}': {err}", tileset.name)),
        }
    }

    if images.is_empty() {
        return Err(format!(
            "No tileset images resolved for map ({} tilesets declared)",
            map.tilesets.len()
        ));
    }
    log::info!(
        "Tilesets resolved: {}/{}",
        images.len(),
        map.tilesets.len()
    );
    Ok(images)
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct MapJson {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    orientation: Option<String>,
    #[serde(default)]
    infinite: bool,
    layers: Vec<LayerJson>,
    #[serde(default)]
    tilesets: Vec<TilesetJson>,
}

#[derive(Debug, Deserialize)]
struct LayerJson {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    data: Option<Vec<u32>>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default = "default_visible")]
    visible: bool,
}

#[derive(Debug, Deserialize)]
struct TilesetJson {
    firstgid: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    spacing: u32,
}

pub fn load_tilemap_from_path(path: &Path) -> Result<TileMap, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read map {}: {e}", path.display()))?;
    let map = parse_tilemap(&raw).map_err(|e| format!("Map {}: {e}", path.display()))?;

    for name in DRAW_ORDER {
        if map.layer(name).is_none() {
            log::warn!("Map {} has no '{}' layer; skipping it", path.display(), name);
        }
    }
    log::info!(
        "Map loaded: {} ({}x{} tiles of {}x{}, {} layers, {} tilesets)",
        path.display(),
        map.width,
        map.height,
        map.tile_width,
        map.tile_height,
        map.layers.len(),
        map.tilesets.len()
    );
    Ok(map)
}

pub fn parse_tilemap(raw: &str) -> Result<TileMap, String> {
    let json: MapJson =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse map JSON: {e}"))?;
    validate_map(&json)?;

    let mut layers = Vec::new();
    for layer in json.layers {
        if layer.kind != "tilelayer" {
            log::debug!("Ignoring non-tile layer '{}' ({})", layer.name, layer.kind);
            continue;
        }
        let data = layer
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|gid| gid & !GID_FLIP_MASK)
            .collect();
        layers.push(TileLayer {
            name: layer.name,
            width: layer.width,
            height: layer.height,
            visible: layer.visible,
            data,
        });
    }

    let mut tilesets: Vec<Tileset> = json
        .tilesets
        .into_iter()
        .map(|ts| Tileset {
            name: if ts.name.is_empty() {
                format!("tileset_{}", ts.firstgid)
            } else {
                ts.name
            },
            first_gid: ts.firstgid,
            image: if ts.source.is_some() { None } else { ts.image },
            image_width: ts.imagewidth,
            image_height: ts.imageheight,
            tile_width: ts.tilewidth,
            tile_height: ts.tileheight,
            columns: ts.columns,
            tile_count: ts.tilecount,
            margin: ts.margin,
            spacing: ts.spacing,
        })
        .collect();
    tilesets.sort_by_key(|ts| ts.first_gid);

    Ok(TileMap {
        width: json.width,
        height: json.height,
        tile_width: json.tilewidth,
        tile_height: json.tileheight,
        layers,
        tilesets,
    })
}

fn validate_map(json: &MapJson) -> Result<(), String> {
    if let Some(orientation) = &json.orientation {
        if orientation != "orthogonal" {
            return Err(format!(
                "Map validation failed: unsupported orientation '{orientation}'"
            ));
        }
    }
    if json.infinite {
        return Err("Map validation failed: infinite (chunked) maps are not supported".to_string());
    }
    if json.width == 0 || json.height == 0 {
        return Err("Map validation failed: width and height must be > 0".to_string());
    }
    if json.tilewidth == 0 || json.tileheight == 0 {
        return Err("Map validation failed: tile size must be > 0".to_string());
    }
    // Cell indices and pixel extents are computed in u32 later on.
    let cells = json.width.checked_mul(json.height);
    let pixels_w = json.width.checked_mul(json.tilewidth);
    let pixels_h = json.height.checked_mul(json.tileheight);
    let (Some(cells), Some(_), Some(_)) = (cells, pixels_w, pixels_h) else {
        return Err(format!(
            "Map validation failed: {}x{} tiles of {}x{} px is too large",
            json.width, json.height, json.tilewidth, json.tileheight
        ));
    };

    let mut names = HashSet::new();
    for layer in json.layers.iter().filter(|l| l.kind == "tilelayer") {
        if !names.insert(layer.name.as_str()) {
            return Err(format!(
                "Map validation failed: duplicate layer name '{}'",
                layer.name
            ));
        }
        if let Some(encoding) = &layer.encoding {
            if encoding != "csv" {
                return Err(format!(
                    "Map validation failed: layer '{}' uses unsupported encoding '{}'",
                    layer.name, encoding
                ));
            }
        }
        if layer.width != json.width || layer.height != json.height {
            return Err(format!(
                "Map validation failed: layer '{}' is {}x{}, map is {}x{}",
                layer.name, layer.width, layer.height, json.width, json.height
            ));
        }
        let expected = cells as usize;
        let actual = layer.data.as_ref().map_or(0, Vec::len);
        if actual != expected {
            return Err(format!(
                "Map validation failed: layer '{}' has {} cells, expected {}",
                layer.name, actual, expected
            ));
        }
    }

    for ts in &json.tilesets {
        if ts.source.is_some() {
            continue;
        }
        if ts.tilewidth == 0 || ts.tileheight == 0 || ts.columns == 0 {
            return Err(format!(
                "Map validation failed: tileset '{}' has zero tile size or columns",
                ts.name
            ));
        }
    }
    Ok(())
}

const fn default_visible() -> bool {
    true
}
