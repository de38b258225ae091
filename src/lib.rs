//! Lucid Maze - simulation core for a tilt-controlled maze
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, maze rotation, bonuses)
//! - `settings`: Data-driven tunables, loadable from JSON
//! - `error`: Construction-time errors (bad maze sizes, bad config)
//!
//! Rendering, sensor input and persistence live in the host. The core takes a
//! steering vector per step and exposes positions, the active grid and the
//! lucidity scalar for presentation.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::SimConfig;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate; velocities are expressed per step at this rate
    pub const STEP_RATE: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / STEP_RATE;
    /// Longest stretch (in nominal steps) a single step may cover
    pub const MAX_FRAMES: f32 = 4.0;
    /// Substep length as a fraction of the ball radius
    pub const SUBSTEP_FRACTION: f32 = 0.5;
    /// Upper bound on collision substeps per step
    pub const MAX_SUBSTEPS: usize = 64;

    /// Maze dimensions accepted by the generator (in rooms)
    pub const MIN_ROOMS: usize = 2;
    pub const MAX_ROOMS: usize = 256;

    /// Lucidity band thresholds (strictly above the threshold = brighter band)
    pub const LUCID_THRESHOLD: f32 = 0.75;
    pub const HAZY_THRESHOLD: f32 = 0.5;
    pub const FOGGY_THRESHOLD: f32 = 0.25;

    /// Default lucidity lost per step
    pub const LUCIDITY_DECAY: f32 = 0.0004;

    /// Below this distance a collision normal is treated as undefined
    pub const NORMAL_EPSILON: f32 = 0.0001;

    /// Ball defaults (pixels, pixels per step)
    pub const BALL_RADIUS: f32 = 12.0;
    pub const INPUT_GAIN: f32 = 0.05;
    pub const DAMPING: f32 = 0.95;
    pub const MAX_AXIS_SPEED: f32 = 20.0;

    /// Wave distortion hint for renderers
    pub const WAVE_MAX_AMPLITUDE: f32 = 15.0;
    pub const WAVE_FREQUENCY: f32 = 0.1;
    pub const WAVE_PHASE_STEP: f32 = 0.05;
}

/// Rotate a vector by an angle in degrees (counter-clockwise in a y-up frame)
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    if degrees == 0.0 {
        return v;
    }
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// True when both components are finite
#[inline]
pub fn is_finite_vec(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
