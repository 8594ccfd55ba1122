//! # Game Module
//!
//! Run state, story content, combat and the progression controller.
//!
//! This module contains the core of a Pandora run:
//! - Run state and dialogue checkpoints (what gets persisted)
//! - Fixed narrative lines keyed by floor
//! - The per-encounter combat resolver
//! - The progression controller that sequences everything

pub mod combat;
pub mod progression;
pub mod settings;
pub mod state;
pub mod story;

pub use combat::*;
pub use progression::*;
pub use settings::*;
pub use state::*;
