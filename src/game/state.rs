//! # Run State Module
//!
//! The data a run carries between checkpoints.
//!
//! [`RunState`] is owned by the progression controller and only changes at
//! checkpoint boundaries. [`DialogueCheckpoint`] records a position inside a
//! branching dialogue so that an interrupted branch resumes on the line where it
//! stopped. Together they form the [`Snapshot`] written to the persistence store.

use crate::config;
use crate::generation::{EffectKind, EffectRecord};
use serde::{Deserialize, Serialize};

/// Current and maximum player health, passed by value between components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: i32,
    pub max_health: i32,
}

impl Vitals {
    pub fn new(health: i32, max_health: i32) -> Self {
        Self { health, max_health }
    }

    /// Full health at the given maximum.
    pub fn full(max_health: i32) -> Self {
        Self::new(max_health, max_health)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Progress of a run: floor, accumulated effects and player health.
///
/// Invariants: `0 <= player_health <= player_max_health` and
/// `1 <= current_floor <= max_floors + 1`, where `max_floors + 1` marks a
/// finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub current_floor: u32,
    pub active_curses: Vec<String>,
    pub active_blessings: Vec<String>,
    pub player_health: i32,
    pub player_max_health: i32,
}

impl RunState {
    /// Creates a fresh run on floor 1 at full health.
    ///
    /// # Examples
    ///
    /// ```
    /// use pandora::RunState;
    ///
    /// let run = RunState::new(100);
    /// assert_eq!(run.current_floor, 1);
    /// assert_eq!(run.player_health, 100);
    /// assert!(run.active_curses.is_empty());
    /// ```
    pub fn new(max_health: i32) -> Self {
        Self {
            current_floor: 1,
            active_curses: Vec::new(),
            active_blessings: Vec::new(),
            player_health: max_health,
            player_max_health: max_health,
        }
    }

    pub fn vitals(&self) -> Vitals {
        Vitals::new(self.player_health, self.player_max_health)
    }

    /// Replaces health, clamping into `0..=max_health`.
    pub fn set_vitals(&mut self, vitals: Vitals) {
        self.player_max_health = vitals.max_health.max(0);
        self.player_health = vitals.health.clamp(0, self.player_max_health);
    }

    /// Appends an effect to the matching list. Effects are never removed.
    pub fn record_effect(&mut self, record: EffectRecord) {
        match record.kind {
            EffectKind::Curse => self.active_curses.push(record.id),
            EffectKind::Blessing => self.active_blessings.push(record.id),
        }
    }

    pub fn has_active_curses(&self) -> bool {
        !self.active_curses.is_empty()
    }

    /// Whether every floor up to `max_floors` has been cleared.
    pub fn is_complete(&self, max_floors: u32) -> bool {
        self.current_floor > max_floors
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(config::DEFAULT_PLAYER_HEALTH)
    }
}

/// Resumable position inside a branching dialogue.
///
/// `line_index` is the next line still to be shown; lines before it have been
/// fully displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueCheckpoint {
    pub choice_made: bool,
    pub chosen_branch: bool,
    pub line_index: usize,
    pub lines: Vec<String>,
}

impl DialogueCheckpoint {
    /// Starts a branch at its first line.
    pub fn begin(chosen_branch: bool, lines: &[&str]) -> Self {
        Self {
            choice_made: true,
            chosen_branch,
            line_index: 0,
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }

    /// Whether there is an interrupted branch worth replaying.
    pub fn is_resumable(&self) -> bool {
        self.choice_made && self.line_index < self.lines.len()
    }

    /// The next line to show, if any remain.
    pub fn current_line(&self) -> Option<&str> {
        self.lines.get(self.line_index).map(String::as_str)
    }

    pub fn remaining_lines(&self) -> &[String] {
        self.lines.get(self.line_index..).unwrap_or(&[])
    }
}

/// Everything written to and read from the persistence store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub run: RunState,
    pub dialogue: DialogueCheckpoint,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every floor cleared
    Victory,
    /// The player fell in combat
    Defeat,
    /// The player left; the last checkpoint is the recovery point
    Quit,
}
