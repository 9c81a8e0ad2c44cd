//! The running scene: every piece of mutable game state, advanced one fixed
//! step at a time by [`GameSession::step`].

use glam::Vec2;

use glade_core::animation::{AnimationCatalog, AnimationPlayer};
use glade_core::events::{EventQueue, Scheduler};
use glade_core::input::{Action, ActionMap, InputState, MouseBtn};
use glade_devtools::OverlayRect;
use glade_render::Camera2D;

use crate::animation::CLIP_IDLE;
use crate::camera_director::CameraDirector;
use crate::config::{CollisionConfig, GameConfig};
use crate::controller::{ControlIntent, PlayerController};
use crate::editor::{CollisionEditor, EditOutcome};
use crate::obstacles::ObstacleSet;
use crate::overrides::{CollisionOverrides, KeyValueStore};
use crate::tilemap::{TileKey, TileMap};

/// Deferred notifications, handled once per step after simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    AnimationComplete(String),
    BeginFollow,
}

/// Everything one fixed step needs from the input devices.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub intent: ControlIntent,
    pub toggle_debug: bool,
    /// Left click this step, in screen pixels.
    pub click: Option<Vec2>,
}

impl FrameInput {
    pub fn capture(input: &InputState, actions: &ActionMap) -> Self {
        let intent = ControlIntent {
            left: actions.is_active(input, Action::MoveLeft),
            right: actions.is_active(input, Action::MoveRight),
            up: actions.is_active(input, Action::MoveUp),
            down: actions.is_active(input, Action::MoveDown),
            attack_pressed: actions.is_triggered(input, Action::Attack),
            hurt_pressed: actions.is_triggered(input, Action::Hurt),
        };
        let click = input.is_mouse_just_pressed(MouseBtn::Left).then(|| {
            let (x, y) = input.mouse_position;
            Vec2::new(x as f32, y as f32)
        });
        Self {
            intent,
            toggle_debug: actions.is_triggered(input, Action::ToggleDebug),
            click,
        }
    }

    /// Same held directions with every edge-triggered part dropped.
    pub fn held_only(&self) -> Self {
        Self {
            intent: ControlIntent {
                attack_pressed: false,
                hurt_pressed: false,
                ..self.intent
            },
            toggle_debug: false,
            click: None,
        }
    }
}

pub struct GameSession {
    pub map: TileMap,
    pub obstacles: ObstacleSet,
    pub overrides: CollisionOverrides,
    pub player: PlayerController,
    pub animator: AnimationPlayer,
    pub camera: Camera2D,
    pub editor: CollisionEditor,
    catalog: AnimationCatalog,
    store: Box<dyn KeyValueStore>,
    director: CameraDirector,
    scheduler: Scheduler<GameEvent>,
    events: EventQueue<GameEvent>,
    collision: CollisionConfig,
    sim_time_us: u64,
    step_count: u64,
}

impl GameSession {
    pub fn new(
        config: &GameConfig,
        map: TileMap,
        catalog: AnimationCatalog,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let overrides = CollisionOverrides::load(store.as_ref());
        let obstacles = ObstacleSet::build(&map, &overrides, config.collision.hitbox_scale);
        if obstacles.is_empty() {
            log::warn!("Map has no obstacles in its Trees or Fences layers");
        }
        let player = PlayerController::new(spawn_point(&map, config.player.spawn_tile), config.player);

        let mut animator = AnimationPlayer::new();
        animator.play(CLIP_IDLE);

        let mut camera = Camera2D::new(config.viewport_width, config.viewport_height);
        let mut director = CameraDirector::new(config.camera);
        let mut scheduler = Scheduler::new();
        director.start(&mut camera, map.world_size(), &mut scheduler);

        Self {
            map,
            obstacles,
            overrides,
            player,
            animator,
            camera,
            editor: CollisionEditor::new(config.editor_enabled),
            catalog,
            store,
            director,
            scheduler,
            events: EventQueue::new(),
            collision: config.collision,
            sim_time_us: 0,
            step_count: 0,
        }
    }

    pub fn step(&mut self, input: &FrameInput, dt_us: u64) {
        // 1. Debug toggle and collision editing.
        if input.toggle_debug {
            self.editor.toggle_debug();
        }
        if let Some(screen) = input.click {
            let world = self.camera.screen_to_world(screen);
            let outcome = self.editor.click(
                world,
                &self.map,
                &mut self.obstacles,
                &mut self.overrides,
                self.store.as_mut(),
            );
            if outcome != EditOutcome::Inactive {
                log::debug!("Click at world ({:.1}, {:.1}): {:?}", world.x, world.y, outcome);
            }
        }

        // 2. Player state machine.
        if let Some(request) = self.player.update(input.intent) {
            self.animator.play(request.clip);
        }

        // 3. Physics.
        let dt = dt_us as f32 / 1_000_000.0;
        self.player
            .move_body(&self.obstacles, dt, self.collision.manual_overlap_correction);
        self.player.clamp_to_world(self.map.world_size());

        // 4. Animation.
        let clip = self.animator.current().and_then(|name| self.catalog.clip(name));
        if let Some(clip) = clip {
            if let Some(done) = self.animator.tick(dt_us, clip) {
                self.events.push(GameEvent::AnimationComplete(done.clip_name));
            }
        }

        // 5. Timers.
        self.scheduler.advance(dt_us, &mut self.events);

        // 6. Deferred events.
        for event in self.events.drain() {
            match &event {
                GameEvent::AnimationComplete(name) => self.player.on_animation_complete(name),
                GameEvent::BeginFollow => self.director.on_event(&event, &mut self.camera),
            }
        }

        // 7. Camera.
        self.director.update(&mut self.camera, self.player.position());

        self.sim_time_us += dt_us;
        self.step_count += 1;
    }

    pub fn catalog(&self) -> &AnimationCatalog {
        &self.catalog
    }

    #[cfg(test)]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    #[cfg(test)]
    pub fn camera_phase(&self) -> crate::camera_director::CameraPhase {
        self.director.phase()
    }

    pub fn sim_time_us(&self) -> u64 {
        self.sim_time_us
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn overlay_rects(&self) -> Vec<OverlayRect> {
        self.editor
            .overlay_rects(&self.map, &self.obstacles, &self.overrides)
    }
}

/// World centre of `tile`, or of the map when the tile lies outside it.
fn spawn_point(map: &TileMap, tile: (u32, u32)) -> Vec2 {
    let (x, y) = tile;
    if x < map.width && y < map.height {
        let (min, max) = map.tile_bounds(TileKey::new(x, y));
        (min + max) * 0.5
    } else {
        log::warn!(
            "Spawn tile ({x}, {y}) is outside the {}x{} map; spawning at map centre",
            map.width,
            map.height
        );
        map.world_size() * 0.5
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::animation::{builtin_catalog, CLIP_ATTACK, CLIP_RUN};
    use crate::camera_director::CameraPhase;
    use crate::controller::PlayerState;
    use crate::overrides::{MemoryStore, OVERRIDES_KEY};
    use crate::tilemap::tests::sample_map;
    use glade_core::input::Key;
    use serde_json::json;

    pub(crate) const STEP_US: u64 = 16_667;

    pub(crate) fn test_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.player.spawn_tile = (0, 1);
        config.viewport_width = 320;
        config.viewport_height = 240;
        config
    }

    pub(crate) fn session_with(store: MemoryStore) -> GameSession {
        GameSession::new(&test_config(), sample_map(), builtin_catalog(), Box::new(store))
    }

    pub(crate) fn session() -> GameSession {
        session_with(MemoryStore::default())
    }

    #[test]
    fn capture_reads_levels_edges_and_clicks() {
        let actions = ActionMap::default();
        let mut input = InputState::new();
        input.key_down(Key::D);
        input.key_down(Key::Space);
        input.mouse_position = (12.0, 34.0);
        input.mouse_down(MouseBtn::Left);

        let frame = FrameInput::capture(&input, &actions);
        assert!(frame.intent.right);
        assert!(frame.intent.attack_pressed);
        assert_eq!(frame.click, Some(Vec2::new(12.0, 34.0)));

        input.end_frame();
        let held = FrameInput::capture(&input, &actions);
        assert!(held.intent.right);
        assert!(!held.intent.attack_pressed);
        assert_eq!(held.click, None);
    }

    #[test]
    fn held_only_keeps_directions_and_drops_edges() {
        let frame = FrameInput {
            intent: ControlIntent {
                up: true,
                attack_pressed: true,
                ..ControlIntent::default()
            },
            toggle_debug: true,
            click: Some(Vec2::ONE),
        };
        let held = frame.held_only();
        assert!(held.intent.up);
        assert!(!held.intent.attack_pressed);
        assert!(!held.toggle_debug);
        assert_eq!(held.click, None);
    }

    #[test]
    fn new_session_starts_idle_in_overview() {
        let session = session();
        assert_eq!(session.player.position(), Vec2::new(8.0, 24.0));
        assert_eq!(session.animator.current(), Some(CLIP_IDLE));
        assert_eq!(session.camera_phase(), CameraPhase::Overview);
        assert_eq!(session.obstacles.len(), 3);
    }

    #[test]
    fn out_of_bounds_spawn_falls_back_to_map_centre() {
        let mut config = test_config();
        config.player.spawn_tile = (40, 40);
        let session = GameSession::new(
            &config,
            sample_map(),
            builtin_catalog(),
            Box::new(MemoryStore::default()),
        );
        assert_eq!(session.player.position(), Vec2::new(32.0, 24.0));
    }

    #[test]
    fn stored_overrides_disable_obstacles_at_start() {
        let mut store = MemoryStore::default();
        store.set(OVERRIDES_KEY, json!(["2,2"])).expect("memory set");
        let session = session_with(store);
        assert!(!session.obstacles.is_blocking(TileKey::new(2, 2)));
        assert!(session.overrides.contains(TileKey::new(2, 2)));
    }

    #[test]
    fn step_moves_and_plays_run() {
        let mut session = session();
        let input = FrameInput {
            intent: ControlIntent {
                right: true,
                ..ControlIntent::default()
            },
            ..FrameInput::default()
        };
        session.step(&input, STEP_US);
        assert_eq!(session.animator.current(), Some(CLIP_RUN));
        assert_eq!(session.player.velocity, Vec2::new(150.0, 0.0));
        assert!(session.player.position().x > 8.0);
    }

    #[test]
    fn attack_completion_is_delivered_through_the_queue() {
        let mut session = session();
        let press = FrameInput {
            intent: ControlIntent {
                attack_pressed: true,
                ..ControlIntent::default()
            },
            ..FrameInput::default()
        };
        session.step(&press, STEP_US);
        assert_eq!(session.animator.current(), Some(CLIP_ATTACK));
        assert_eq!(session.player.state(), PlayerState::Attacking);

        // 7 frames at 14 fps = 500 ms = 30 steps of 16.667 ms.
        for _ in 0..28 {
            session.step(&FrameInput::default(), STEP_US);
        }
        assert!(session.player.is_attacking());
        session.step(&FrameInput::default(), STEP_US);
        assert!(!session.player.is_attacking());
    }

    #[test]
    fn debug_click_toggles_tree_and_persists() {
        let mut session = session();
        let tree_world = Vec2::new(40.0, 40.0);
        let click = session.camera.world_to_screen(tree_world);

        session.step(
            &FrameInput {
                click: Some(click),
                ..FrameInput::default()
            },
            STEP_US,
        );
        assert!(session.obstacles.is_blocking(TileKey::new(2, 2)), "debug off");

        session.step(
            &FrameInput {
                toggle_debug: true,
                click: Some(click),
                ..FrameInput::default()
            },
            STEP_US,
        );
        assert!(session.editor.is_active());
        assert!(!session.obstacles.is_blocking(TileKey::new(2, 2)));
        assert_eq!(session.store().get(OVERRIDES_KEY), Some(json!(["2,2"])));
        assert_eq!(session.overlay_rects().len(), 3);
    }

    #[test]
    fn camera_switches_to_follow_after_two_seconds() {
        let mut session = session();
        let overview_zoom = session.camera.zoom;
        // min(320/64, 240/48) * 0.85
        assert!((overview_zoom - 4.25).abs() < 1e-5);

        for _ in 0..119 {
            session.step(&FrameInput::default(), STEP_US);
        }
        assert_eq!(session.camera_phase(), CameraPhase::Overview);
        session.step(&FrameInput::default(), STEP_US);
        assert_eq!(session.camera_phase(), CameraPhase::Follow);
        assert_eq!(session.camera.zoom, 1.2);
    }
}
