//! Error types for the simulation core.
//!
//! Only construction can fail. Per-step code treats degenerate input as a
//! no-op and never returns an error.

use thiserror::Error;

/// Errors raised while building a maze or loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested maze is too small to carve or too large to allocate
    #[error("invalid maze size {rooms_wide}x{rooms_high} rooms (each side must be {min}..={max})")]
    InvalidMazeSize {
        rooms_wide: usize,
        rooms_high: usize,
        min: usize,
        max: usize,
    },

    /// Carving finished without opening a boundary exit
    #[error("maze has no boundary exit")]
    NoExit,

    /// Configuration JSON could not be parsed
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// A configuration value is out of range
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates an invalid-config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result alias for fallible construction.
pub type Result<T> = std::result::Result<T, Error>;
