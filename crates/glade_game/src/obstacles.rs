//! Static obstacles built from the map's Trees and Fences layers.
//!
//! One obstacle per grid position: a tile present on both layers yields a
//! single rectangle. Obstacles are never edited in place; the debug editor
//! removes one or builds a fresh one from the map.

use glam::Vec2;
use std::collections::BTreeMap;

use crate::collision::Aabb;
use crate::overrides::CollisionOverrides;
use crate::tilemap::{TileKey, TileMap, OBSTACLE_LAYERS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub key: TileKey,
    pub bounds: Aabb,
    pub blocks: bool,
}

#[derive(Debug, Clone)]
pub struct ObstacleSet {
    tile_size: Vec2,
    grid: (u32, u32),
    hitbox_scale: f32,
    obstacles: BTreeMap<TileKey, Obstacle>,
}

impl ObstacleSet {
    /// Scan the obstacle layers, skipping keys listed in `overrides`.
    pub fn build(map: &TileMap, overrides: &CollisionOverrides, hitbox_scale: f32) -> Self {
        let mut set = Self {
            tile_size: map.tile_size(),
            grid: (map.width, map.height),
            hitbox_scale,
            obstacles: BTreeMap::new(),
        };

        let mut skipped = 0usize;
        for layer in OBSTACLE_LAYERS {
            for tile in map.tiles(layer) {
                if overrides.contains(tile.key) {
                    skipped += 1;
                    continue;
                }
                set.insert_tile(map, tile.key);
            }
        }
        log::info!(
            "Obstacles built: {} blocking, {} disabled by overrides (hitbox scale {})",
            set.len(),
            skipped,
            hitbox_scale
        );
        set
    }

    /// Create the obstacle for `key` if an obstacle layer has a tile there.
    /// Returns false when there is nothing to collide with at `key`.
    pub fn insert_tile(&mut self, map: &TileMap, key: TileKey) -> bool {
        let occupied = OBSTACLE_LAYERS
            .iter()
            .any(|layer| map.tile_at(layer, key.x, key.y).unwrap_or(0) > 0);
        if !occupied {
            return false;
        }
        let (min, max) = map.tile_bounds(key);
        let footprint = Aabb::from_min_max(min, max);
        let bounds = Aabb::from_center(
            footprint.center(),
            (max - min) * self.hitbox_scale,
        );
        self.obstacles.insert(
            key,
            Obstacle {
                key,
                bounds,
                blocks: true,
            },
        );
        true
    }

    pub fn remove(&mut self, key: TileKey) -> Option<Obstacle> {
        self.obstacles.remove(&key)
    }

    pub fn get(&self, key: TileKey) -> Option<&Obstacle> {
        self.obstacles.get(&key)
    }

    pub fn is_blocking(&self, key: TileKey) -> bool {
        self.get(key).is_some_and(|o| o.blocks)
    }

    /// Row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Obstacles whose tile footprint `area` touches.
    pub fn query<'a>(&'a self, area: &Aabb) -> impl Iterator<Item = &'a Obstacle> + 'a {
        self.tile_range(area)
            .into_iter()
            .flat_map(|(x0, x1, y0, y1)| {
                (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| TileKey::new(x, y)))
            })
            .filter_map(move |key| self.obstacles.get(&key))
    }

    fn tile_range(&self, area: &Aabb) -> Option<(u32, u32, u32, u32)> {
        let (cols, rows) = self.grid;
        if cols == 0 || rows == 0 {
            return None;
        }
        let min = area.min() / self.tile_size;
        let max = area.max() / self.tile_size;
        if max.x < 0.0 || max.y < 0.0 || min.x >= cols as f32 || min.y >= rows as f32 {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.floor() as u32).min(cols - 1);
        let y1 = (max.y.floor() as u32).min(rows - 1);
        Some((x0, x1, y0, y1))
    }
}
