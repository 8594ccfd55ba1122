//! # Input Module
//!
//! Input sources that report discrete player commands.

pub mod commands;
pub mod scripted;

pub use commands::*;
pub use scripted::*;

use macroquad::prelude::*;

/// Anything that can report the player's next command.
pub trait InputSource {
    /// Returns the command issued since the last poll, if any.
    fn poll_command(&mut self) -> Option<Command>;
}

/// Keyboard input through macroquad.
///
/// Only reads keys pressed during the current frame, so it must be polled from
/// inside the macroquad frame loop.
pub struct InputHandler {
    /// Whether letter keys (A/D) act as combat shortcuts alongside 1/2
    pub letter_shortcuts: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use pandora::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(input_handler.letter_shortcuts);
    /// ```
    pub fn new() -> Self {
        Self {
            letter_shortcuts: true,
        }
    }

    fn process_macroquad_input(&self) -> Option<Command> {
        if is_key_pressed(KeyCode::Escape) {
            return Some(Command::Quit);
        }
        if is_key_pressed(KeyCode::F5) {
            return Some(Command::Save);
        }

        if is_key_pressed(KeyCode::Key1) {
            return Some(Command::Attack);
        }
        if is_key_pressed(KeyCode::Key2) {
            return Some(Command::Defend);
        }
        if self.letter_shortcuts {
            if is_key_pressed(KeyCode::A) {
                return Some(Command::Attack);
            }
            if is_key_pressed(KeyCode::D) {
                return Some(Command::Defend);
            }
        }

        if is_key_pressed(KeyCode::Y) {
            return Some(Command::ChoiceYes);
        }
        if is_key_pressed(KeyCode::N) {
            return Some(Command::ChoiceNo);
        }

        if is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Enter) {
            return Some(Command::Skip);
        }

        None
    }
}

impl InputSource for InputHandler {
    fn poll_command(&mut self) -> Option<Command> {
        self.process_macroquad_input()
    }
}
