//! Ball motion: steering, clamps, stuck recovery and screen bounds
//!
//! Velocities are pixels per nominal step. `frames` is the number of nominal
//! steps a call covers (1.0 at the fixed rate).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{self, CollisionInfo};
use super::grid::OccupancyGrid;
use super::layout::GridLayout;
use crate::consts::{MAX_SUBSTEPS, SUBSTEP_FRACTION};
use crate::settings::PhysicsSettings;

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }
}

/// Advances the ball between steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionIntegrator {
    settings: PhysicsSettings,
    /// Position at the start of the previous step
    last_pos: Vec2,
    stuck_counter: u32,
}

impl MotionIntegrator {
    pub fn new(settings: PhysicsSettings, start: Vec2) -> Self {
        Self {
            settings,
            last_pos: start,
            stuck_counter: 0,
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn stuck_counter(&self) -> u32 {
        self.stuck_counter
    }

    /// Forget motion history (after a teleport)
    pub fn reset(&mut self, pos: Vec2) {
        self.last_pos = pos;
        self.stuck_counter = 0;
    }

    /// Accelerate by the (already distorted) steering and clamp each axis
    pub fn apply_input(&self, ball: &mut Ball, steer: Vec2, frames: f32) {
        let max = self.settings.max_axis_speed;
        ball.vel += steer * self.settings.input_gain * frames;
        ball.vel = ball.vel.clamp(Vec2::splat(-max), Vec2::splat(max));
    }

    /// Move the ball through the grid in substeps no longer than a
    /// fraction of its radius, resolving wall contact after each one.
    /// Returns true if any substep hit a wall.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        ball: &mut Ball,
        steer: Vec2,
        frames: f32,
        grid: &OccupancyGrid,
        layout: &GridLayout,
        rng: &mut R,
    ) -> bool {
        self.check_stuck(ball, rng);
        self.last_pos = ball.pos;

        let step_size = (ball.radius * SUBSTEP_FRACTION).max(f32::EPSILON);
        let move_dist = (ball.vel * frames).length();
        let num_steps = if move_dist.is_finite() {
            ((move_dist / step_size).ceil() as usize).clamp(1, MAX_SUBSTEPS)
        } else {
            MAX_SUBSTEPS
        };
        let step_frames = frames / num_steps as f32;

        let mut wall_hit = false;
        for _ in 0..num_steps {
            let prev = ball.pos;
            ball.pos += ball.vel * step_frames;
            wall_hit |= self.collide(ball, prev, grid, layout).collided;
        }

        // A resting ball would never pick up tiny steering; seed it directly
        let s = &self.settings;
        let rest = s.rest_threshold;
        if ball.vel.x.abs() < rest && ball.vel.y.abs() < rest && steer.abs().max_element() > s.idle_kick_threshold {
            ball.vel = steer * s.idle_kick_gain;
        }
        wall_hit
    }

    fn check_stuck<R: Rng + ?Sized>(&mut self, ball: &mut Ball, rng: &mut R) {
        let s = &self.settings;
        let moved = (ball.pos - self.last_pos).abs();
        if moved.x < s.stuck_threshold && moved.y < s.stuck_threshold {
            self.stuck_counter += 1;
            if self.stuck_counter > s.stuck_frames {
                let kick = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * s.stuck_kick;
                ball.vel += kick;
                self.stuck_counter = 0;
                log::debug!("Stuck ball at {:?}, kicked by {:?}", ball.pos, kick);
            }
        } else {
            self.stuck_counter = 0;
        }
    }

    /// Push the ball out of the deepest wall overlap and bounce
    pub fn collide(&self, ball: &mut Ball, prev: Vec2, grid: &OccupancyGrid, layout: &GridLayout) -> CollisionInfo {
        let hit = collision::detect(ball.pos, ball.radius, grid, layout.cell_size, layout.origin(grid));
        if hit.collided {
            ball.pos = prev + hit.correction();
            ball.vel = collision::resolve(&hit, ball.vel, self.settings.damping);
        }
        hit
    }

    /// Reflect off the viewport edges, then apply per-step damping
    pub fn confine(&self, ball: &mut Ball, viewport: Vec2, frames: f32) {
        let damping = self.settings.damping;
        let r = ball.radius;
        for axis in 0..2 {
            let hi = viewport[axis] - r;
            if ball.pos[axis] < r {
                ball.pos[axis] = r;
                ball.vel[axis] = -ball.vel[axis] * damping;
            } else if ball.pos[axis] > hi {
                ball.pos[axis] = hi.max(r);
                ball.vel[axis] = -ball.vel[axis] * damping;
            }
        }
        ball.vel *= damping.powf(frames);
    }
}
