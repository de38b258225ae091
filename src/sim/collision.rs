//! Collision detection and response against the occupancy grid
//!
//! The ball is a circle, every wall cell an axis-aligned box. Only the 3x3
//! neighborhood around the ball's cell is tested; the deepest overlap wins.

use glam::Vec2;

use super::grid::{Cell, OccupancyGrid};
use crate::consts::NORMAL_EPSILON;
use crate::is_finite_vec;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Whether a collision occurred
    pub collided: bool,
    /// Unit normal pointing from the wall toward the ball center.
    /// Zero when the center sits on the wall surface (degenerate).
    pub normal: Vec2,
    /// Overlap depth (radius - distance)
    pub penetration: f32,
    /// Closest point on the wall
    pub contact: Vec2,
}

impl CollisionInfo {
    pub fn miss() -> Self {
        Self {
            collided: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
            contact: Vec2::ZERO,
        }
    }

    /// Positional correction to add to the pre-move position
    #[inline]
    pub fn correction(&self) -> Vec2 {
        if self.collided {
            self.normal * self.penetration
        } else {
            Vec2::ZERO
        }
    }
}

/// Circle vs. wall-cell boxes around the ball.
///
/// Touching (distance equal to the radius) counts as contact, so a ball
/// resting against a wall still bounces when pushed into it.
pub fn detect(
    ball_pos: Vec2,
    ball_radius: f32,
    grid: &OccupancyGrid,
    cell_size: f32,
    origin: Vec2,
) -> CollisionInfo {
    if !(cell_size > 0.0) || !is_finite_vec(ball_pos) {
        return CollisionInfo::miss();
    }
    let local = (ball_pos - origin) / cell_size;
    let (row, col) = (local.y.floor() as i64, local.x.floor() as i64);
    // No wall cell can be in reach once the neighborhood misses the grid
    let (rows, cols) = (grid.rows() as i64, grid.cols() as i64);
    if row < -1 || col < -1 || row > rows || col > cols {
        return CollisionInfo::miss();
    }
    let radius_sq = ball_radius * ball_radius;

    let mut best = CollisionInfo::miss();
    for dr in -1..=1 {
        for dc in -1..=1 {
            let (r, c) = (row + dr, col + dc);
            if grid.get_signed(r, c) != Some(Cell::Wall) {
                continue;
            }
            let min = origin + Vec2::new(c as f32, r as f32) * cell_size;
            let max = min + Vec2::splat(cell_size);
            let closest = ball_pos.clamp(min, max);
            let offset = ball_pos - closest;
            let dist_sq = offset.length_squared();
            if dist_sq > radius_sq {
                continue;
            }

            let distance = dist_sq.sqrt();
            let penetration = ball_radius - distance;
            if best.collided && penetration <= best.penetration {
                continue;
            }
            let normal = if distance > NORMAL_EPSILON {
                offset / distance
            } else {
                Vec2::ZERO
            };
            best = CollisionInfo {
                collided: true,
                normal,
                penetration,
                contact: closest,
            };
        }
    }
    best
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce the velocity off the collision normal.
///
/// The normal term is scaled by `damping`: v' = v - 2(v·n)n·damping.
/// A ball already moving away from the wall is left untouched.
pub fn resolve(collision: &CollisionInfo, velocity: Vec2, damping: f32) -> Vec2 {
    if !collision.collided {
        return velocity;
    }
    let along = velocity.dot(collision.normal);
    if along > 0.0 {
        return velocity;
    }
    velocity - 2.0 * along * collision.normal * damping
}
