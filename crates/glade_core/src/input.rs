//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   physically down. Movement reads this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only for the frame
//!   the transition happened. Attack, hurt and the debug toggle read this.
//!   Transitions are cleared by `end_frame()`, which the main loop calls only
//!   after at least one fixed simulation step has consumed them, so a press
//!   landing on a frame with zero steps is not lost.
//!
//! Gameplay code never asks about physical keys directly: it goes through an
//! [`ActionMap`], which binds one or more keys to each [`Action`].

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Space,
    H,
    F4,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

/// Logical game actions, decoupled from the physical keys that trigger them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Attack,
    Hurt,
    ToggleDebug,
    Quit,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::Attack,
        Action::Hurt,
        Action::ToggleDebug,
        Action::Quit,
    ];
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,
    mouse_just_released: HashSet<MouseBtn>,

    /// Cursor position in physical window pixels.
    pub mouse_position: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_held: HashSet::new(),
            mouse_just_pressed: HashSet::new(),
            mouse_just_released: HashSet::new(),
            mouse_position: (0.0, 0.0),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        // OS key repeat re-sends key_down while held; only the first counts.
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        if self.mouse_held.insert(btn) {
            self.mouse_just_pressed.insert(btn);
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        if self.mouse_held.remove(&btn) {
            self.mouse_just_released.insert(btn);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.contains(&btn)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key bindings for every [`Action`]. An action fires when any bound key does.
#[derive(Debug, Clone)]
pub struct ActionMap {
    bindings: HashMap<Action, Vec<Key>>,
}

impl ActionMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, action: Action, key: Key) {
        let keys = self.bindings.entry(action).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    pub fn keys_for(&self, action: Action) -> &[Key] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Level-triggered query: true while any bound key is held.
    pub fn is_active(&self, input: &InputState, action: Action) -> bool {
        self.keys_for(action).iter().any(|&key| input.is_held(key))
    }

    /// Edge-triggered query: true only on the step a bound key went down.
    pub fn is_triggered(&self, input: &InputState, action: Action) -> bool {
        self.keys_for(action)
            .iter()
            .any(|&key| input.is_just_pressed(key))
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(Action::MoveLeft, Key::Left);
        map.bind(Action::MoveLeft, Key::A);
        map.bind(Action::MoveRight, Key::Right);
        map.bind(Action::MoveRight, Key::D);
        map.bind(Action::MoveUp, Key::Up);
        map.bind(Action::MoveUp, Key::W);
        map.bind(Action::MoveDown, Key::Down);
        map.bind(Action::MoveDown, Key::S);
        map.bind(Action::Attack, Key::Space);
        map.bind(Action::Hurt, Key::H);
        map.bind(Action::ToggleDebug, Key::F4);
        map.bind(Action::Quit, Key::Escape);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn test_key_repeat_does_not_retrigger_after_end_frame() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.end_frame();
        // Auto-repeat delivers another key_down while still held.
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(!input.is_just_pressed(Key::Space));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::H);
        assert!(!input.is_just_released(Key::H));
        assert!(!input.is_held(Key::H));
    }

    #[test]
    fn test_end_frame_keeps_held_clears_transients() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.mouse_down(MouseBtn::Left);
        input.end_frame();
        assert!(input.is_held(Key::Left));
        assert!(!input.is_just_pressed(Key::Left));
        assert!(input.is_mouse_held(MouseBtn::Left));
        assert!(!input.is_mouse_just_pressed(MouseBtn::Left));
    }

    #[test]
    fn test_release_then_press_retriggers() {
        let mut input = InputState::new();
        input.key_down(Key::F4);
        input.end_frame();
        input.key_up(Key::F4);
        assert!(input.is_just_released(Key::F4));
        input.end_frame();
        input.key_down(Key::F4);
        assert!(input.is_just_pressed(Key::F4));
    }

    #[test]
    fn test_default_bindings_cover_every_action() {
        let map = ActionMap::default();
        for &action in Action::ALL {
            assert!(
                !map.keys_for(action).is_empty(),
                "{action:?} has no default key"
            );
        }
    }

    #[test]
    fn test_action_active_via_any_bound_key() {
        let map = ActionMap::default();
        let mut input = InputState::new();
        input.key_down(Key::A);
        assert!(map.is_active(&input, Action::MoveLeft));
        assert!(!map.is_active(&input, Action::MoveRight));
    }

    #[test]
    fn test_action_triggered_only_on_edge() {
        let map = ActionMap::default();
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(map.is_triggered(&input, Action::Attack));
        input.end_frame();
        assert!(map.is_active(&input, Action::Attack));
        assert!(!map.is_triggered(&input, Action::Attack));
    }

    #[test]
    fn test_bind_ignores_duplicates() {
        let mut map = ActionMap::empty();
        map.bind(Action::Hurt, Key::H);
        map.bind(Action::Hurt, Key::H);
        assert_eq!(map.keys_for(Action::Hurt), &[Key::H]);
    }
}
