//! # Pandora
//!
//! A turn-based descent through Pandora's Box, told one terminal line at a time.
//!
//! ## Architecture Overview
//!
//! The crate is built around a single progression engine and a handful of narrow
//! collaborators:
//!
//! - **Progression**: the controller that sequences floors, story beats, combat,
//!   post-victory effects and checkpoints
//! - **Combat**: one encounter's turn loop (player action, enemy retaliation)
//! - **Generation**: seedable random selection of enemies, curses, blessings and
//!   dungeon events from weighted pools
//! - **Persistence**: a flat key/value snapshot store that lets an interrupted run
//!   (including a half-played dialogue branch) resume where it stopped
//! - **Rendering / Input**: adapters that reveal lines of text and report discrete
//!   player commands
//!
//! The controller is a cooperative state machine: a scheduler (a macroquad frame
//! loop, or a fixed tick in headless mode) calls [`ProgressionController::step`]
//! repeatedly, and every mutation of run state happens between suspension points.

pub mod game;
pub mod generation;
pub mod input;
pub mod persistence;
pub mod rendering;
pub mod scenes;

#[cfg(test)]
pub(crate) mod test_support;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use persistence::*;
pub use rendering::*;

/// Core error type for the Pandora engine.
#[derive(thiserror::Error, Debug)]
pub enum PandoraError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A required adapter, pool or narrative entry was not wired
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Configuration names something that does not exist or is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation was attempted in a state that does not allow it
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// The snapshot store could not be read or written
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// A stored value could not be decoded
    #[error("Corrupt snapshot value for '{key}': {value:?}")]
    CorruptSnapshot { key: String, value: String },
}

/// Result type used throughout the Pandora codebase.
pub type PandoraResult<T> = Result<T, PandoraError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Number of floors in a run
    pub const MAX_FLOORS: u32 = 5;

    /// Default player starting (and maximum) health
    pub const DEFAULT_PLAYER_HEALTH: i32 = 100;

    /// Pause after an ordinary line, in milliseconds
    pub const LINE_PAUSE_MS: u64 = 300;

    /// Pause after a dialogue branch line, in milliseconds
    pub const DIALOGUE_PAUSE_MS: u64 = 500;

    /// Default location of the snapshot file
    pub const DEFAULT_SAVE_PATH: &str = "pandora_save.json";

    /// Ticks per second in headless mode
    pub const TARGET_FPS: u64 = 60;
}
