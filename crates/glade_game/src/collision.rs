//! Player-vs-obstacle collision.
//!
//! The main algorithm is **axis-separable move-and-slide**: resolve X movement
//! first against the obstacle set, then resolve Y using the already-corrected
//! X position. Motion into an obstacle stops flush with its face and the body
//! keeps sliding along the free axis.
//!
//! [`correct_overlaps`] is a second, optional pass that pushes the body out of
//! any obstacle it still overlaps along the axis of least penetration.

use glam::Vec2;

use crate::obstacles::ObstacleSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            center_x: center.x,
            center_y: center.y,
            half_w: size.x * 0.5,
            half_h: size.y * 0.5,
        }
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::from_center((min + max) * 0.5, max - min)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.center_x - self.half_w, self.center_y - self.half_h)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.center_x + self.half_w, self.center_y + self.half_h)
    }

    /// Strict overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (self.center_x - other.center_x).abs() < self.half_w + other.half_w
            && (self.center_y - other.center_y).abs() < self.half_h + other.half_h
    }

    /// Penetration depth on each axis. Non-positive when apart.
    pub fn penetration(&self, other: &Aabb) -> Vec2 {
        Vec2::new(
            self.half_w + other.half_w - (self.center_x - other.center_x).abs(),
            self.half_h + other.half_h - (self.center_y - other.center_y).abs(),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionMoveResult {
    pub aabb: Aabb,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_up: bool,
    pub blocked_down: bool,
}

#[cfg(test)]
pub fn move_and_collide(obstacles: &ObstacleSet, aabb: Aabb, dx: f32, dy: f32) -> Aabb {
    move_and_collide_detailed(obstacles, aabb, dx, dy).aabb
}

pub fn move_and_collide_detailed(
    obstacles: &ObstacleSet,
    aabb: Aabb,
    dx: f32,
    dy: f32,
) -> CollisionMoveResult {
    const EPS: f32 = 0.0001;

    let resolved_x = resolve_axis_x(obstacles, aabb, dx);
    let collided_x = (resolved_x - (aabb.center_x + dx)).abs() > EPS;

    let mut moved = aabb;
    moved.center_x = resolved_x;
    let resolved_y = resolve_axis_y(obstacles, moved, dy);
    let collided_y = (resolved_y - (aabb.center_y + dy)).abs() > EPS;
    moved.center_y = resolved_y;

    // World space is y-down: positive dy moves toward the bottom of the map.
    CollisionMoveResult {
        aabb: moved,
        blocked_left: collided_x && dx < 0.0,
        blocked_right: collided_x && dx > 0.0,
        blocked_up: collided_y && dy < 0.0,
        blocked_down: collided_y && dy > 0.0,
    }
}

fn resolve_axis_x(obstacles: &ObstacleSet, aabb: Aabb, dx: f32) -> f32 {
    if dx == 0.0 {
        return aabb.center_x;
    }

    const EPS: f32 = 0.001;
    let mut candidate_x = aabb.center_x + dx;
    let start_min = aabb.center_x - aabb.half_w;
    let start_max = aabb.center_x + aabb.half_w;

    // Swept box over the whole step, slightly thinned on Y so sliding along
    // a face does not catch on it.
    let swept = Aabb::from_min_max(
        Vec2::new(start_min.min(start_min + dx), aabb.center_y - aabb.half_h + EPS),
        Vec2::new(start_max.max(start_max + dx), aabb.center_y + aabb.half_h - EPS),
    );

    for obstacle in obstacles.query(&swept).filter(|o| o.blocks) {
        if !obstacle.bounds.overlaps(&swept) {
            continue;
        }
        let obs_min = obstacle.bounds.min().x;
        let obs_max = obstacle.bounds.max().x;
        if dx > 0.0 && obs_min >= start_max - EPS {
            candidate_x = candidate_x.min(obs_min - aabb.half_w);
        } else if dx < 0.0 && obs_max <= start_min + EPS {
            candidate_x = candidate_x.max(obs_max + aabb.half_w);
        }
    }

    // Guardrail: never push opposite direction during resolution.
    if dx > 0.0 {
        candidate_x.max(aabb.center_x)
    } else {
        candidate_x.min(aabb.center_x)
    }
}

fn resolve_axis_y(obstacles: &ObstacleSet, aabb: Aabb, dy: f32) -> f32 {
    if dy == 0.0 {
        return aabb.center_y;
    }

    const EPS: f32 = 0.001;
    let mut candidate_y = aabb.center_y + dy;
    let start_min = aabb.center_y - aabb.half_h;
    let start_max = aabb.center_y + aabb.half_h;

    let swept = Aabb::from_min_max(
        Vec2::new(aabb.center_x - aabb.half_w + EPS, start_min.min(start_min + dy)),
        Vec2::new(aabb.center_x + aabb.half_w - EPS, start_max.max(start_max + dy)),
    );

    for obstacle in obstacles.query(&swept).filter(|o| o.blocks) {
        if !obstacle.bounds.overlaps(&swept) {
            continue;
        }
        let obs_min = obstacle.bounds.min().y;
        let obs_max = obstacle.bounds.max().y;
        if dy > 0.0 && obs_min >= start_max - EPS {
            candidate_y = candidate_y.min(obs_min - aabb.half_h);
        } else if dy < 0.0 && obs_max <= start_min + EPS {
            candidate_y = candidate_y.max(obs_max + aabb.half_h);
        }
    }

    // Guardrail: never push opposite direction during resolution.
    if dy > 0.0 {
        candidate_y.max(aabb.center_y)
    } else {
        candidate_y.min(aabb.center_y)
    }
}

/// Push `aabb` out of every blocking obstacle it still overlaps.
///
/// Each overlap is resolved on the axis with the smaller penetration. The
/// direction on that axis comes from comparing the obstacle and body centres.
/// Any correction zeroes `velocity`. Returns the number of obstacles resolved;
/// zero means nothing changed.
pub fn correct_overlaps(obstacles: &ObstacleSet, aabb: &mut Aabb, velocity: &mut Vec2) -> usize {
    let candidates: Vec<Aabb> = obstacles
        .query(aabb)
        .filter(|o| o.blocks)
        .map(|o| o.bounds)
        .collect();

    let mut corrected = 0;
    for bounds in candidates {
        if !aabb.overlaps(&bounds) {
            continue;
        }
        let depth = aabb.penetration(&bounds);
        if depth.x < depth.y {
            if aabb.center_x < bounds.center_x {
                aabb.center_x -= depth.x;
            } else {
                aabb.center_x += depth.x;
            }
        } else if aabb.center_y < bounds.center_y {
            aabb.center_y -= depth.y;
        } else {
            aabb.center_y += depth.y;
        }
        corrected += 1;
    }

    if corrected > 0 {
        *velocity = Vec2::ZERO;
    }
    corrected
}
