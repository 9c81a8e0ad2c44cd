use glam::Vec2;

use crate::animation::{CLIP_ATTACK, CLIP_HURT, CLIP_IDLE, CLIP_RUN};
use crate::collision::{self, Aabb, CollisionMoveResult};
use crate::config::PlayerConfig;
use crate::obstacles::ObstacleSet;

/// Per-step player intent. Directions are level-triggered (held), actions
/// edge-triggered (pressed this step).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub attack_pressed: bool,
    pub hurt_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Moving,
    Attacking,
    Hurting,
}

/// Clip the controller wants playing from this step on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationRequest {
    pub clip: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    pub body: Aabb,
    pub velocity: Vec2,
    /// Sprite mirrored horizontally (facing left).
    pub flip_x: bool,
    pub contacts: ContactState,
    state: PlayerState,
    /// Clip last requested; cleared when a once-clip completes.
    animation: Option<&'static str>,
    config: PlayerConfig,
}

impl PlayerController {
    pub fn new(spawn: Vec2, config: PlayerConfig) -> Self {
        Self {
            body: Aabb::from_center(spawn, Vec2::new(config.body_width, config.body_height)),
            velocity: Vec2::ZERO,
            flip_x: false,
            contacts: ContactState::default(),
            state: PlayerState::Idle,
            animation: Some(CLIP_IDLE),
            config,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_attacking(&self) -> bool {
        self.state == PlayerState::Attacking
    }

    pub fn is_hurting(&self) -> bool {
        self.state == PlayerState::Hurting
    }

    pub fn position(&self) -> Vec2 {
        self.body.center()
    }

    /// Apply one step of intent. Returns a request when the wanted clip
    /// changes.
    pub fn update(&mut self, intent: ControlIntent) -> Option<AnimationRequest> {
        if self.is_attacking() || self.is_hurting() {
            // Directional input and further action presses are dropped.
            self.velocity = Vec2::ZERO;
            return None;
        }

        if intent.attack_pressed {
            self.enter(PlayerState::Attacking);
            return self.request(CLIP_ATTACK);
        }
        if intent.hurt_pressed {
            self.enter(PlayerState::Hurting);
            return self.request(CLIP_HURT);
        }

        let speed = self.config.speed;
        let mut velocity = Vec2::ZERO;
        // Left and up take precedence when both keys of an axis are held.
        if intent.left {
            velocity.x = -speed;
            self.flip_x = true;
        } else if intent.right {
            velocity.x = speed;
            self.flip_x = false;
        }
        if intent.up {
            velocity.y = -speed;
        } else if intent.down {
            velocity.y = speed;
        }
        if self.config.normalize_diagonal && velocity.x != 0.0 && velocity.y != 0.0 {
            velocity = velocity.normalize() * speed;
        }
        self.velocity = velocity;

        if velocity != Vec2::ZERO {
            self.state = PlayerState::Moving;
            self.request(CLIP_RUN)
        } else {
            self.state = PlayerState::Idle;
            self.request(CLIP_IDLE)
        }
    }

    /// A once-clip finished. Only the matching transient state ends.
    pub fn on_animation_complete(&mut self, clip: &str) {
        let ended = match (self.state, clip) {
            (PlayerState::Attacking, CLIP_ATTACK) => true,
            (PlayerState::Hurting, CLIP_HURT) => true,
            _ => false,
        };
        if ended {
            log::debug!("Player {:?} finished", self.state);
            self.state = PlayerState::Idle;
            self.animation = None;
        }
    }

    /// Move the body by `velocity * dt` against `obstacles`, then optionally
    /// push it out of anything it still overlaps.
    pub fn move_body(&mut self, obstacles: &ObstacleSet, dt: f32, correct_overlaps: bool) {
        let dx = self.velocity.x * dt;
        let dy = self.velocity.y * dt;
        let result = collision::move_and_collide_detailed(obstacles, self.body, dx, dy);
        self.apply_collision_result(result);

        if correct_overlaps {
            let corrected =
                collision::correct_overlaps(obstacles, &mut self.body, &mut self.velocity);
            if corrected > 0 {
                log::debug!("Overlap correction pushed player out of {corrected} obstacle(s)");
            }
        }
    }

    /// Keep the body inside the map rectangle `[0, world_size]`.
    pub fn clamp_to_world(&mut self, world_size: Vec2) {
        let half = Vec2::new(self.body.half_w, self.body.half_h);
        let lo = half;
        let hi = (world_size - half).max(lo);
        let center = self.body.center().clamp(lo, hi);
        if center.x != self.body.center_x {
            self.velocity.x = 0.0;
        }
        if center.y != self.body.center_y {
            self.velocity.y = 0.0;
        }
        self.body.center_x = center.x;
        self.body.center_y = center.y;
    }

    fn apply_collision_result(&mut self, result: CollisionMoveResult) {
        self.body = result.aabb;
        let contacts = ContactState {
            left: result.blocked_left,
            right: result.blocked_right,
            up: result.blocked_up,
            down: result.blocked_down,
        };
        if contacts != self.contacts {
            log::trace!("Player contacts {:?}", contacts);
        }
        self.contacts = contacts;

        if (result.blocked_left && self.velocity.x < 0.0)
            || (result.blocked_right && self.velocity.x > 0.0)
        {
            self.velocity.x = 0.0;
        }
        if (result.blocked_up && self.velocity.y < 0.0)
            || (result.blocked_down && self.velocity.y > 0.0)
        {
            self.velocity.y = 0.0;
        }
    }

    fn enter(&mut self, state: PlayerState) {
        log::debug!("Player {:?} -> {:?}", self.state, state);
        self.state = state;
        self.velocity = Vec2::ZERO;
    }

    fn request(&mut self, clip: &'static str) -> Option<AnimationRequest> {
        if self.animation == Some(clip) {
            return None;
        }
        self.animation = Some(clip);
        Some(AnimationRequest { clip })
    }
}
