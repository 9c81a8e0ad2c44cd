//! Draws a [`GameSession`] onto a canvas: tile layers back to front, the
//! player, then the collision overlay when debug mode is on.

use glam::Vec2;

use glade_devtools::{DebugOverlay, OverlayKind, OverlayRect};
use glade_render::{Camera2D, Canvas, Rgba, SrcRect};

use crate::assets::SceneAssets;
use crate::session::GameSession;
use crate::tilemap::{TileLayer, TileMap};

const BACKGROUND: Rgba = [24, 32, 28, 255];

pub struct SceneRenderer {
    assets: SceneAssets,
    overlay: DebugOverlay,
}

impl SceneRenderer {
    pub fn new(assets: SceneAssets) -> Self {
        Self {
            assets,
            overlay: DebugOverlay::new(),
        }
    }

    pub fn draw(&mut self, canvas: &mut Canvas<'_>, session: &GameSession) {
        canvas.clear(BACKGROUND);
        let camera = &session.camera;

        for layer in session.map.ordered_layers() {
            if layer.visible {
                self.draw_layer(canvas, camera, &session.map, layer);
            }
        }

        self.draw_player(canvas, session);

        self.overlay.set_visible(session.editor.is_active());
        if self.overlay.visible {
            let mut rects = session.overlay_rects();
            rects.push(OverlayRect {
                min: session.player.body.min(),
                max: session.player.body.max(),
                kind: OverlayKind::Body,
            });
            self.overlay.draw(canvas, camera, &rects);
        }
    }

    fn draw_layer(&self, canvas: &mut Canvas<'_>, camera: &Camera2D, map: &TileMap, layer: &TileLayer) {
        let (view_min, view_max) = camera.visible_bounds();
        let tile = map.tile_size();
        let x0 = (view_min.x / tile.x).floor().max(0.0) as u32;
        let y0 = (view_min.y / tile.y).floor().max(0.0) as u32;
        let x1 = ((view_max.x / tile.x).ceil().max(0.0) as u32).min(map.width);
        let y1 = ((view_max.y / tile.y).ceil().max(0.0) as u32).min(map.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let Some(gid) = layer.index_at(x, y).filter(|&gid| gid > 0) else {
                    continue;
                };
                let Some(tileset) = map.tileset_for(gid) else {
                    continue;
                };
                let (Some(image), Some(src)) =
                    (self.assets.tilesets.get(&tileset.name), tileset.locate(gid))
                else {
                    continue;
                };
                let min = Vec2::new(x as f32, y as f32) * tile;
                canvas.blit_world(camera, image, src, min, min + tile, false);
            }
        }
    }

    /// Strips for every catalog sheet are loaded up front, so the player is
    /// only skipped before the first clip starts.
    fn draw_player(&self, canvas: &mut Canvas<'_>, session: &GameSession) {
        let player = &session.player;
        let catalog = session.catalog();
        let Some(clip) = session.animator.current().and_then(|name| catalog.clip(name)) else {
            return;
        };
        let (Some(sheet), Some(strip)) = (
            catalog.sheet_for(clip),
            self.assets.sprites.get(&clip.sheet),
        ) else {
            return;
        };

        let (x, y, w, h) = sheet.frame_rect(session.animator.sheet_frame(clip));
        let size = Vec2::new(w as f32, h as f32);
        // Feet sit on the bottom of the collision body.
        let center = player.position();
        let min = Vec2::new(center.x - size.x * 0.5, player.body.max().y - size.y);
        canvas.blit_world(
            &session.camera,
            strip,
            SrcRect { x, y, w, h },
            min,
            min + size,
            player.flip_x,
        );
    }
}
