//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (bonuses by ID)
//! - No rendering or platform dependencies

pub mod bonus;
pub mod collision;
pub mod configs;
pub mod grid;
pub mod layout;
pub mod lucidity;
pub mod machine;
pub mod maze;
pub mod motion;
pub mod state;
pub mod tick;

pub use bonus::{Bonus, BonusSpawner};
pub use collision::{CollisionInfo, detect, reflect_velocity, resolve};
pub use configs::{ConfigState, MazeConfigurationSet, derive_rotations};
pub use grid::{Cell, GridPos, OccupancyGrid, Turn};
pub use layout::GridLayout;
pub use lucidity::{ControlDistortion, Lucidity, LucidityBand, WaveEffect};
pub use machine::{MazeStateMachine, Transition};
pub use maze::{MazeGenerator, generate_maze};
pub use motion::{Ball, MotionIntegrator};
pub use state::{SimPhase, Simulation};
pub use tick::{StepInput, StepOutcome, on_viewport_changed, step};
