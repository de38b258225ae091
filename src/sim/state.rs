//! Simulation state
//!
//! Everything one run needs lives here. Components only borrow each other
//! for the duration of a step.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bonus::{Bonus, BonusSpawner};
use super::configs::ConfigState;
use super::grid::{GridPos, OccupancyGrid};
use super::layout::GridLayout;
use super::lucidity::{Lucidity, LucidityBand, WaveEffect};
use super::machine::MazeStateMachine;
use super::maze::MazeGenerator;
use super::motion::{Ball, MotionIntegrator};
use crate::error::{Error, Result};
use crate::settings::SimConfig;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Steps advance the world
    Running,
    /// Toggled by the host
    Paused,
    /// Ball reached the exit
    Escaped,
    /// Lucidity ran out
    Depleted,
}

/// Complete simulation state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) layout: GridLayout,
    pub(crate) machine: MazeStateMachine,
    pub(crate) ball: Ball,
    pub(crate) motion: MotionIntegrator,
    pub(crate) bonuses: BonusSpawner,
    pub(crate) lucidity: Lucidity,
    pub(crate) phase: SimPhase,
    pub(crate) rng: Pcg32,
    /// Steps that advanced the world
    pub(crate) steps: u64,
}

impl Simulation {
    /// Generate a maze from `seed` and start a run on it. The same seeded
    /// generator then drives bonuses and stuck kicks.
    pub fn new(config: SimConfig, viewport: Vec2, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let grid = MazeGenerator::new(config.maze.rooms_wide, config.maze.rooms_high)?.generate(&mut rng)?;
        log::info!(
            "Generated {}x{} maze (seed {}) for a {}x{} viewport",
            grid.cols(),
            grid.rows(),
            seed,
            viewport.x,
            viewport.y
        );
        Self::with_rng(config, grid, viewport, rng)
    }

    /// Start a run on a prebuilt grid with an injected generator
    pub fn with_rng(config: SimConfig, grid: OccupancyGrid, viewport: Vec2, rng: Pcg32) -> Result<Self> {
        config.validate()?;
        if !(viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(Error::invalid_config(format!("viewport must be positive, got {viewport:?}")));
        }
        let start = grid
            .first_passage()
            .ok_or_else(|| Error::invalid_config("maze has no passage to start on"))?;
        let layout = GridLayout::fit(viewport, grid.rows(), grid.cols());
        let machine = MazeStateMachine::new(grid)?;
        let pos = layout.cell_center(machine.active_grid(), start);
        let ball = Ball::new(pos, config.physics.ball_radius);

        log::info!(
            "Simulation started: ball at {:?}, exit at {:?}, cell size {:.2}",
            start,
            machine.exit(),
            layout.cell_size
        );

        Ok(Self {
            motion: MotionIntegrator::new(config.physics.clone(), pos),
            bonuses: BonusSpawner::new(config.bonus.clone())?,
            lucidity: Lucidity::new(config.lucidity.initial, config.lucidity.decay),
            config,
            layout,
            machine,
            ball,
            phase: SimPhase::Running,
            rng,
            steps: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Grid the ball currently moves through
    pub fn active_grid(&self) -> &OccupancyGrid {
        self.machine.active_grid()
    }

    pub fn config_state(&self) -> ConfigState {
        self.machine.state()
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn cell_size(&self) -> f32 {
        self.layout.cell_size
    }

    /// World position of the active grid's top-left corner
    pub fn grid_origin(&self) -> Vec2 {
        self.layout.origin(self.active_grid())
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn bonuses(&self) -> &[Bonus] {
        self.bonuses.bonuses()
    }

    pub fn lucidity(&self) -> f32 {
        self.lucidity.value()
    }

    pub fn lucidity_band(&self) -> LucidityBand {
        self.lucidity.band()
    }

    /// Presentation-only wall wave
    pub fn wave(&self) -> WaveEffect {
        self.lucidity.wave()
    }

    /// Exit marker in the active grid's coordinates
    pub fn exit_cell(&self) -> GridPos {
        self.machine.exit()
    }

    /// World position of the exit marker
    pub fn exit_position(&self) -> Vec2 {
        self.layout.cell_center(self.active_grid(), self.machine.exit())
    }

    /// Restore a saved lucidity (clamped to [0, 1]). The maze follows on
    /// the next step.
    pub fn set_lucidity(&mut self, value: f32) {
        self.lucidity.set(value);
    }
}
