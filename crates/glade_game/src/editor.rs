//! In-game collision editor, live only while debug mode is on.
//!
//! Clicking a tree flips its collision and immediately persists the full
//! override set.

use glam::Vec2;

use glade_devtools::debug_overlay::{OverlayKind, OverlayRect};

use crate::obstacles::ObstacleSet;
use crate::overrides::{CollisionOverrides, KeyValueStore};
use crate::tilemap::{TileKey, TileMap, LAYER_TREES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Debug mode is off or editing is disabled.
    Inactive,
    /// Outside the map or not on a tree.
    Ignored,
    Disabled(TileKey),
    Enabled(TileKey),
}

pub struct CollisionEditor {
    debug: bool,
    editing_allowed: bool,
}

impl CollisionEditor {
    pub fn new(editing_allowed: bool) -> Self {
        Self {
            debug: false,
            editing_allowed,
        }
    }

    /// Flip debug mode; returns the new state.
    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        log::info!("Debug mode: {}", if self.debug { "ON" } else { "OFF" });
        self.debug
    }

    pub fn is_active(&self) -> bool {
        self.debug
    }

    pub fn click(
        &mut self,
        world_point: Vec2,
        map: &TileMap,
        obstacles: &mut ObstacleSet,
        overrides: &mut CollisionOverrides,
        store: &mut dyn KeyValueStore,
    ) -> EditOutcome {
        if !self.debug || !self.editing_allowed {
            return EditOutcome::Inactive;
        }
        let Some(tile) = map.tile_at_world(LAYER_TREES, world_point) else {
            return EditOutcome::Ignored;
        };
        let key = tile.key;

        let outcome = if overrides.remove(key) {
            obstacles.insert_tile(map, key);
            log::info!("Collision enabled for tree at {key}");
            EditOutcome::Enabled(key)
        } else {
            obstacles.remove(key);
            overrides.insert(key);
            log::info!("Collision disabled for tree at {key}");
            EditOutcome::Disabled(key)
        };

        if let Err(e) = overrides.save(store) {
            log::error!("Failed to save collision overrides: {e}");
        }
        outcome
    }

    /// Red for each blocking obstacle, green for each tree whose collision
    /// is off.
    pub fn overlay_rects(
        &self,
        map: &TileMap,
        obstacles: &ObstacleSet,
        overrides: &CollisionOverrides,
    ) -> Vec<OverlayRect> {
        let mut rects: Vec<OverlayRect> = obstacles
            .iter()
            .filter(|o| o.blocks)
            .map(|o| OverlayRect {
                min: o.bounds.min(),
                max: o.bounds.max(),
                kind: OverlayKind::Blocking,
            })
            .collect();

        rects.extend(
            map.tiles(LAYER_TREES)
                .filter(|tile| overrides.contains(tile.key))
                .map(|tile| {
                    let (min, max) = map.tile_bounds(tile.key);
                    OverlayRect {
                        min,
                        max,
                        kind: OverlayKind::Passable,
                    }
                }),
        );
        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{MemoryStore, OVERRIDES_KEY};
    use crate::tilemap::tests::sample_map;
    use serde_json::json;

    struct Fixture {
        map: TileMap,
        obstacles: ObstacleSet,
        overrides: CollisionOverrides,
        store: MemoryStore,
        editor: CollisionEditor,
    }

    impl Fixture {
        fn new() -> Self {
            let map = sample_map();
            let overrides = CollisionOverrides::default();
            let obstacles = ObstacleSet::build(&map, &overrides, 0.75);
            Self {
                map,
                obstacles,
                overrides,
                store: MemoryStore::default(),
                editor: CollisionEditor::new(true),
            }
        }

        fn click(&mut self, x: f32, y: f32) -> EditOutcome {
            self.editor.click(
                Vec2::new(x, y),
                &self.map,
                &mut self.obstacles,
                &mut self.overrides,
                &mut self.store,
            )
        }
    }

    // Sample map trees sit at (1,0) and (2,2); a fence at (3,1).

    #[test]
    fn clicks_do_nothing_while_debug_is_off() {
        let mut fx = Fixture::new();
        assert_eq!(fx.click(24.0, 8.0), EditOutcome::Inactive);
        assert!(fx.obstacles.is_blocking(TileKey::new(1, 0)));
        assert!(fx.store.get(OVERRIDES_KEY).is_none());
    }

    #[test]
    fn toggle_off_then_on_restores_collision() {
        let mut fx = Fixture::new();
        fx.editor.toggle_debug();
        let key = TileKey::new(1, 0);

        assert_eq!(fx.click(24.0, 8.0), EditOutcome::Disabled(key));
        assert!(!fx.obstacles.is_blocking(key));
        assert_eq!(fx.store.get(OVERRIDES_KEY), Some(json!(["1,0"])));

        assert_eq!(fx.click(20.0, 2.0), EditOutcome::Enabled(key));
        assert!(fx.obstacles.is_blocking(key));
        assert!(fx.overrides.is_empty());
        assert_eq!(fx.store.get(OVERRIDES_KEY), Some(json!([])));
    }

    #[test]
    fn empty_cells_fences_and_outside_clicks_are_ignored() {
        let mut fx = Fixture::new();
        fx.editor.toggle_debug();
        assert_eq!(fx.click(4.0, 4.0), EditOutcome::Ignored);
        assert_eq!(fx.click(56.0, 24.0), EditOutcome::Ignored, "fence tile");
        assert_eq!(fx.click(-5.0, 4.0), EditOutcome::Ignored);
        assert_eq!(fx.click(500.0, 4.0), EditOutcome::Ignored);
        assert!(fx.store.get(OVERRIDES_KEY).is_none());
    }

    #[test]
    fn editing_can_be_switched_off_by_config() {
        let mut fx = Fixture::new();
        fx.editor = CollisionEditor::new(false);
        fx.editor.toggle_debug();
        assert_eq!(fx.click(24.0, 8.0), EditOutcome::Inactive);
    }

    #[test]
    fn overlay_marks_blocking_and_disabled_trees() {
        let mut fx = Fixture::new();
        fx.editor.toggle_debug();
        fx.click(40.0, 40.0);

        let rects = fx.editor.overlay_rects(&fx.map, &fx.obstacles, &fx.overrides);
        let blocking = rects.iter().filter(|r| r.kind == OverlayKind::Blocking).count();
        let passable: Vec<&OverlayRect> =
            rects.iter().filter(|r| r.kind == OverlayKind::Passable).collect();
        assert_eq!(blocking, 2);
        assert_eq!(passable.len(), 1);
        assert_eq!(passable[0].min, Vec2::new(32.0, 32.0));
        assert_eq!(passable[0].max, Vec2::new(48.0, 48.0));
    }
}
