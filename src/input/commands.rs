//! # Command Definitions
//!
//! Discrete player commands, independent of where they came from.

use crate::game::PlayerAction;
use serde::{Deserialize, Serialize};

/// A single command reported by an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Attack the current enemy
    Attack,
    /// Defend and recover a little health
    Defend,
    /// Answer yes at a prompt
    ChoiceYes,
    /// Answer no at a prompt
    ChoiceNo,
    /// Finish revealing the current line
    Skip,
    /// Write a manual checkpoint
    Save,
    /// Leave the run
    Quit,
}

impl Command {
    /// The combat action this command maps to, if any.
    pub fn as_player_action(self) -> Option<PlayerAction> {
        match self {
            Command::Attack => Some(PlayerAction::Attack),
            Command::Defend => Some(PlayerAction::Defend),
            _ => None,
        }
    }

    /// The answer this command gives at a yes/no prompt, if any.
    pub fn as_choice(self) -> Option<bool> {
        match self {
            Command::ChoiceYes => Some(true),
            Command::ChoiceNo => Some(false),
            _ => None,
        }
    }

    /// Parses one character of an input script.
    pub fn from_script_char(c: char) -> Option<Command> {
        match c {
            'a' | 'A' | '1' => Some(Command::Attack),
            'd' | 'D' | '2' => Some(Command::Defend),
            'y' | 'Y' => Some(Command::ChoiceYes),
            'n' | 'N' => Some(Command::ChoiceNo),
            ' ' | '.' => Some(Command::Skip),
            's' | 'S' => Some(Command::Save),
            'q' | 'Q' | '\x1B' => Some(Command::Quit),
            _ => None,
        }
    }
}
