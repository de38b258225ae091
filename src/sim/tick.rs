//! Fixed timestep simulation step
//!
//! One call advances the run by one step in a fixed order: distortion,
//! motion, wall collision, bonuses, lucidity, maze reconfiguration, exit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::layout::GridLayout;
use super::machine::Transition;
use super::state::{SimPhase, Simulation};
use crate::consts::{MAX_FRAMES, STEP_RATE};
use crate::is_finite_vec;

/// Input for a single step (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInput {
    /// Raw tilt/steering vector, before lucidity distortion
    pub steer: Vec2,
    /// Pause toggle
    pub pause: bool,
}

/// What happened during a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Lucidity gained from collected bonuses
    pub collected: f32,
    pub exit_reached: bool,
    pub lucidity_depleted: bool,
    /// Set when the ball hit a wall this step
    pub wall_hit: bool,
    pub transition: Option<Transition>,
}

/// Advance the simulation by `dt` seconds
pub fn step(sim: &mut Simulation, input: &StepInput, dt: f32) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    if input.pause {
        match sim.phase {
            SimPhase::Running => {
                sim.phase = SimPhase::Paused;
                return outcome;
            }
            SimPhase::Paused => sim.phase = SimPhase::Running,
            _ => {}
        }
    }
    if sim.phase != SimPhase::Running {
        return outcome;
    }
    if !(dt > 0.0 && dt.is_finite()) || !is_finite_vec(input.steer) {
        log::warn!("Ignoring step with dt {} and steering {:?}", dt, input.steer);
        return outcome;
    }
    // Long stalls are played as a capped stretch
    let frames = (dt * STEP_RATE).min(MAX_FRAMES);

    // Motion and walls
    let steer = sim.lucidity.apply_distortion(input.steer);
    sim.motion.apply_input(&mut sim.ball, steer, frames);
    let grid = sim.machine.active_grid();
    outcome.wall_hit = sim
        .motion
        .advance(&mut sim.ball, steer, frames, grid, &sim.layout, &mut sim.rng);
    sim.motion.confine(&mut sim.ball, sim.layout.viewport, frames);

    // Bonuses feed lucidity
    outcome.collected = sim
        .bonuses
        .update(&mut sim.rng, grid, &sim.layout, sim.ball.pos, sim.ball.radius);
    sim.lucidity.update();
    sim.lucidity.increase(outcome.collected);

    // The maze follows the lucidity band
    outcome.transition = sim
        .machine
        .update(&sim.lucidity, &sim.layout, &mut sim.ball, &mut sim.bonuses);
    if outcome.transition.is_some_and(|t| t.ball_snapped) {
        sim.motion.reset(sim.ball.pos);
    }

    sim.steps += 1;

    let reach = sim.config.maze.exit_reach_cells * sim.layout.cell_size;
    if sim.ball.pos.distance_squared(sim.exit_position()) < reach * reach {
        outcome.exit_reached = true;
        sim.phase = SimPhase::Escaped;
        log::info!("Exit reached after {} steps (lucidity {:.3})", sim.steps, sim.lucidity.value());
    } else if sim.lucidity.is_depleted() {
        outcome.lucidity_depleted = true;
        sim.phase = SimPhase::Depleted;
        log::info!("Lucidity depleted after {} steps", sim.steps);
    }

    outcome
}

/// Refit the maze to a new viewport.
///
/// The ball keeps its fractional placement in the viewport, bonuses keep
/// their place in the grid. Velocity and lucidity are untouched.
pub fn on_viewport_changed(sim: &mut Simulation, width: f32, height: f32) {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        log::warn!("Ignoring viewport change to {}x{}", width, height);
        return;
    }
    let viewport = Vec2::new(width, height);
    let grid = sim.machine.active_grid();
    let old = sim.layout;
    let new = GridLayout::fit(viewport, grid.rows(), grid.cols());
    let (old_origin, new_origin) = (old.origin(grid), new.origin(grid));

    let r = sim.ball.radius;
    let scaled = sim.ball.pos / old.viewport * viewport;
    sim.ball.pos = scaled.clamp(Vec2::splat(r), (viewport - r).max(Vec2::splat(r)));

    sim.bonuses
        .transform_positions(|p| new_origin + (p - old_origin) / old.cell_size * new.cell_size);
    sim.bonuses.set_cell_size(new.cell_size);

    sim.layout = new;
    sim.machine.settle_ball(&sim.layout, &mut sim.ball);
    sim.motion.reset(sim.ball.pos);
    log::debug!("Viewport {}x{}, cell size {:.2}", width, height, new.cell_size);
}
