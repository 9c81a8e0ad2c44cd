//! Glade -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. All simulation runs
//! inside `RedrawRequested` using a **fixed-timestep** model:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- one `GameSession::step` per fixed slice
//!   3. Draw the session into the CPU canvas and present it
//!
//! Content (config, map, animation catalog, images, stored overrides) loads
//! before the event loop starts. Any failure there is fatal and ends the
//! process with an error log.

mod animation;
mod assets;
mod camera_director;
mod collision;
mod config;
mod controller;
mod editor;
mod obstacles;
mod overrides;
mod render;
#[cfg(test)]
mod replay;
mod session;
mod tilemap;

use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::SceneAssets;
use config::{load_config_from_path, GameConfig};
use glade_core::input::{Action, ActionMap, InputState, Key, MouseBtn};
use glade_core::time::FrameClock;
use glade_platform::window::PlatformConfig;
use glade_render::FrameSurface;
use overrides::FileStore;
use render::SceneRenderer;
use session::{FrameInput, GameSession};

const CONFIG_PATH: &str = "assets/config/game.json";

/// Live state once the window exists.
struct GameState {
    window: Arc<Window>,
    surface: FrameSurface,
    clock: FrameClock,
    input: InputState,
    actions: ActionMap,
    session: GameSession,
    renderer: SceneRenderer,
}

struct App {
    platform: PlatformConfig,
    /// Loaded scene waiting for the window.
    pending: Option<(GameSession, SceneRenderer)>,
    state: Option<GameState>,
}

impl App {
    fn new(config: &GameConfig, session: GameSession, renderer: SceneRenderer) -> Self {
        Self {
            platform: PlatformConfig {
                width: config.viewport_width,
                height: config.viewport_height,
                ..PlatformConfig::default()
            },
            pending: Some((session, renderer)),
            state: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let (session, renderer) = self
            .pending
            .take()
            .ok_or_else(|| "Scene was already started".to_string())?;
        let window = glade_platform::window::create_window(event_loop, &self.platform)?;
        let surface = FrameSurface::new(Arc::clone(&window))?;
        self.state = Some(GameState {
            window,
            surface,
            clock: FrameClock::new(),
            input: InputState::new(),
            actions: ActionMap::default(),
            session,
            renderer,
        });
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("{e}");
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            log::info!(
                "Session ended after {} steps ({:.1}s simulated, {} collision overrides)",
                state.session.step_count(),
                state.session.sim_time_us() as f64 / 1_000_000.0,
                state.session.overrides.len()
            );
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    if let Err(e) = state.surface.resize(w, h) {
                        log::error!("{e}");
                        event_loop.exit();
                        return;
                    }
                    state.session.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput { state: pressed, button, .. } => {
                if let Some(btn) = map_mouse(button) {
                    match pressed {
                        ElementState::Pressed => state.input.mouse_down(btn),
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.mouse_position = (position.x, position.y);
            }

            WindowEvent::RedrawRequested => {
                let (w, h) = state.surface.size();
                if w == 0 || h == 0 {
                    return;
                }

                state.clock.begin_frame();
                let mut frame = FrameInput::capture(&state.input, &state.actions);
                while state.clock.should_step() {
                    if state.actions.is_triggered(&state.input, Action::Quit) {
                        log::info!("Quit requested, exiting.");
                        event_loop.exit();
                        return;
                    }
                    state.session.step(&frame, state.clock.fixed_dt_us);
                    // Presses and clicks act on the first step of a frame only.
                    frame = frame.held_only();
                }

                match state.surface.canvas() {
                    Some(mut canvas) => state.renderer.draw(&mut canvas, &state.session),
                    None => log::warn!("Frame buffer size mismatch; skipping draw"),
                }
                if let Err(e) = state.surface.present() {
                    log::error!("{e}");
                    event_loop.exit();
                    return;
                }

                // Only clear edge-triggered input after at least one fixed
                // step consumed it. Otherwise a press landing on a frame with
                // zero steps is lost.
                if state.clock.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Space => Some(Key::Space),
        KeyCode::KeyH => Some(Key::H),
        KeyCode::F4 => Some(Key::F4),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

fn map_mouse(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

/// Load everything the scene needs. Any error here is fatal.
fn load_scene(config: &GameConfig) -> Result<(GameSession, SceneRenderer), String> {
    let map = tilemap::load_tilemap_from_path(&config.map_path)?;
    let catalog = animation::load_player_catalog(config.animation_catalog_path.as_deref())?;
    let assets = SceneAssets::load(&map, &config.map_path, &catalog, &config.sprite_dir)?;
    let store = FileStore::open(&config.store_path);
    log::info!("Store: {}", store.path().display());

    let session = GameSession::new(config, map, catalog, Box::new(store));
    Ok((session, SceneRenderer::new(assets)))
}

fn run() -> Result<(), String> {
    let config = load_config_from_path(Path::new(CONFIG_PATH))?;
    let (session, renderer) = load_scene(&config)?;

    let event_loop = EventLoop::new().map_err(|e| format!("Failed to create event loop: {e}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&config, session, renderer);
    event_loop
        .run_app(&mut app)
        .map_err(|e| format!("Event loop error: {e}"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Glade starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
