//! # Rendering Module
//!
//! Output adapters that present story lines and status messages.
//!
//! The progression controller only talks to the [`Display`] trait. A line handed
//! to [`Display::show_line`] may take a while to appear (a typewriter reveal);
//! the controller polls [`Display::is_complete`] before moving on.

pub mod display;
pub mod transcript;

pub use display::*;
pub use transcript::*;

/// Handle for a line passed to a [`Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u64);

/// Presents narrative lines and status messages to the player.
pub trait Display {
    /// Starts presenting a line and returns its handle.
    fn show_line(&mut self, text: &str) -> LineId;

    /// Whether the line has been fully presented.
    ///
    /// Unknown handles count as complete.
    fn is_complete(&self, id: LineId) -> bool;

    /// Finishes presenting the line immediately.
    fn skip(&mut self, id: LineId);

    /// Replaces the status message, shown apart from the story lines.
    fn show_status(&mut self, text: &str);
}
