//! Simulation tunables
//!
//! Every section defaults to the shipped balance, so partial JSON works.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Maze shape and win condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeSettings {
    /// Rooms across (grid is `2 * rooms + 1` cells wide)
    pub rooms_wide: usize,
    /// Rooms down
    pub rooms_high: usize,
    /// Exit counts as reached within this many cells of its center
    pub exit_reach_cells: f32,
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            rooms_wide: 10,
            rooms_high: 10,
            exit_reach_cells: 0.7,
        }
    }
}

/// Ball motion tunables (pixels and pixels per nominal step)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub ball_radius: f32,
    /// Steering to velocity gain per step
    pub input_gain: f32,
    /// Velocity multiplier per step, also applied to wall bounces
    pub damping: f32,
    /// Per-axis velocity clamp
    pub max_axis_speed: f32,
    /// Movement below this on both axes counts as stuck
    pub stuck_threshold: f32,
    /// Consecutive stuck steps before a kick
    pub stuck_frames: u32,
    /// Full width of the random kick per axis
    pub stuck_kick: f32,
    /// Velocity below this on both axes counts as at rest
    pub rest_threshold: f32,
    /// Steering above this (either axis) wakes a resting ball
    pub idle_kick_threshold: f32,
    /// Steering to velocity gain when waking a resting ball
    pub idle_kick_gain: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            input_gain: INPUT_GAIN,
            damping: DAMPING,
            max_axis_speed: MAX_AXIS_SPEED,
            stuck_threshold: 0.1,
            stuck_frames: 15,
            stuck_kick: 1.5,
            rest_threshold: 0.01,
            idle_kick_threshold: 0.1,
            idle_kick_gain: 0.2,
        }
    }
}

/// Lucidity resource tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuciditySettings {
    pub initial: f32,
    /// Lost every step
    pub decay: f32,
}

impl Default for LuciditySettings {
    fn default() -> Self {
        Self {
            initial: 1.0,
            decay: LUCIDITY_DECAY,
        }
    }
}

/// Bonus spawning tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusSettings {
    /// Maximum simultaneous bonuses
    pub max_active: usize,
    /// Steps that must pass after a spawn before the next one
    pub min_spawn_delay: u32,
    /// Chance per eligible step of attempting a spawn
    pub spawn_probability: f32,
    /// Cells sampled per spawn attempt
    pub max_attempts: usize,
    /// Spawn distance band from the ball, in cells (exclusive)
    pub min_distance_cells: f32,
    pub max_distance_cells: f32,
    /// Lucidity reward range `[value_min, value_max)`
    pub value_min: f32,
    pub value_max: f32,
    /// Pickup radius in cells
    pub radius_cells: f32,
}

impl Default for BonusSettings {
    fn default() -> Self {
        Self {
            max_active: 4,
            min_spawn_delay: 120,
            spawn_probability: 0.501,
            max_attempts: 50,
            min_distance_cells: 3.0,
            max_distance_cells: 10.0,
            value_min: 0.1,
            value_max: 0.6,
            radius_cells: 0.4,
        }
    }
}

impl BonusSettings {
    /// Reject values the spawner cannot sample from
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(Error::invalid_config("bonus.spawn_probability must be in [0, 1]"));
        }
        if !(self.min_distance_cells >= 0.0 && self.min_distance_cells < self.max_distance_cells) {
            return Err(Error::invalid_config(
                "bonus distance band must satisfy 0 <= min < max",
            ));
        }
        if !(self.value_min >= 0.0 && self.value_min < self.value_max && self.value_max.is_finite()) {
            return Err(Error::invalid_config("bonus value range must satisfy 0 <= min < max"));
        }
        if !(self.radius_cells > 0.0) {
            return Err(Error::invalid_config("bonus.radius_cells must be > 0"));
        }
        Ok(())
    }
}

/// All simulation tunables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub maze: MazeSettings,
    pub physics: PhysicsSettings,
    pub lucidity: LuciditySettings,
    pub bonus: BonusSettings,
}

impl SimConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let maze = &self.maze;
        if !(MIN_ROOMS..=MAX_ROOMS).contains(&maze.rooms_wide)
            || !(MIN_ROOMS..=MAX_ROOMS).contains(&maze.rooms_high)
        {
            return Err(Error::InvalidMazeSize {
                rooms_wide: maze.rooms_wide,
                rooms_high: maze.rooms_high,
                min: MIN_ROOMS,
                max: MAX_ROOMS,
            });
        }
        if !(maze.exit_reach_cells > 0.0) {
            return Err(Error::invalid_config("maze.exit_reach_cells must be > 0"));
        }

        let physics = &self.physics;
        if !(physics.ball_radius > 0.0) {
            return Err(Error::invalid_config("physics.ball_radius must be > 0"));
        }
        if !(physics.damping > 0.0 && physics.damping <= 1.0) {
            return Err(Error::invalid_config("physics.damping must be in (0, 1]"));
        }
        if !(physics.max_axis_speed > 0.0) {
            return Err(Error::invalid_config("physics.max_axis_speed must be > 0"));
        }
        if !(physics.input_gain >= 0.0) || !(physics.stuck_kick >= 0.0) {
            return Err(Error::invalid_config(
                "physics.input_gain and physics.stuck_kick must be >= 0",
            ));
        }

        let lucidity = &self.lucidity;
        if !(0.0..=1.0).contains(&lucidity.initial) {
            return Err(Error::invalid_config("lucidity.initial must be in [0, 1]"));
        }
        if !(lucidity.decay >= 0.0) {
            return Err(Error::invalid_config("lucidity.decay must be >= 0"));
        }

        self.bonus.validate()
    }
}
