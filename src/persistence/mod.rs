//! # Persistence Module
//!
//! Checkpoint storage for runs and dialogue positions.
//!
//! Run fields and dialogue fields live under independent flat keys, so either
//! record can be loaded without the other ever having been written. Lists are
//! joined into a single string: effect ids with `,`, dialogue lines with `|`.

pub mod backend;

pub use backend::*;

use crate::game::{DialogueCheckpoint, RunState, Snapshot};
use crate::{PandoraError, PandoraResult};
use log::{debug, info};
use std::str::FromStr;

pub const KEY_GAME_STARTED: &str = "pandora.game_started";
pub const KEY_FLOOR: &str = "run.floor";
pub const KEY_CURSES: &str = "run.curses";
pub const KEY_BLESSINGS: &str = "run.blessings";
pub const KEY_HEALTH: &str = "run.health";
pub const KEY_MAX_HEALTH: &str = "run.max_health";
pub const KEY_CHOICE_MADE: &str = "dialogue.choice_made";
pub const KEY_CHOSEN_BRANCH: &str = "dialogue.chosen_branch";
pub const KEY_LINE_INDEX: &str = "dialogue.line_index";
pub const KEY_LINES: &str = "dialogue.lines";

const EFFECT_DELIMITER: char = ',';
const LINE_DELIMITER: char = '|';

const DIALOGUE_KEYS: &[&str] = &[
    KEY_CHOICE_MADE,
    KEY_CHOSEN_BRANCH,
    KEY_LINE_INDEX,
    KEY_LINES,
];

/// Typed access to run and dialogue checkpoints over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct PersistenceStore<S: KeyValueStore> {
    backend: S,
    default_max_health: i32,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    /// Wraps a backend. `default_max_health` fills in health for runs saved
    /// without it.
    pub fn new(backend: S, default_max_health: i32) -> Self {
        Self {
            backend,
            default_max_health,
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Whether a run has been checkpointed since the store was last erased.
    pub fn has_saved_run(&self) -> PandoraResult<bool> {
        Ok(self.backend.get(KEY_GAME_STARTED)?.as_deref() == Some("true"))
    }

    pub fn save_run_state(&mut self, run: &RunState) -> PandoraResult<()> {
        let entries = run_entries(run)?;
        self.backend.set_many(&entries)?;
        debug!("Saved run state at floor {}", run.current_floor);
        Ok(())
    }

    /// Loads the run, defaulting every missing field to a fresh run's value.
    pub fn load_run_state(&self) -> PandoraResult<RunState> {
        let mut run = RunState::new(self.default_max_health);

        if let Some(floor) = self.parsed::<u32>(KEY_FLOOR)? {
            run.current_floor = floor;
        }
        if let Some(curses) = self.backend.get(KEY_CURSES)? {
            run.active_curses = split_list(&curses, EFFECT_DELIMITER);
        }
        if let Some(blessings) = self.backend.get(KEY_BLESSINGS)? {
            run.active_blessings = split_list(&blessings, EFFECT_DELIMITER);
        }
        if let Some(max_health) = self.parsed::<i32>(KEY_MAX_HEALTH)? {
            run.player_max_health = max_health;
            run.player_health = max_health;
        }
        if let Some(health) = self.parsed::<i32>(KEY_HEALTH)? {
            run.player_health = health;
        }

        Ok(run)
    }

    pub fn save_dialogue_checkpoint(&mut self, dialogue: &DialogueCheckpoint) -> PandoraResult<()> {
        let entries = dialogue_entries(dialogue)?;
        self.backend.set_many(&entries)?;
        debug!(
            "Saved dialogue checkpoint at line {}/{}",
            dialogue.line_index,
            dialogue.lines.len()
        );
        Ok(())
    }

    /// Loads the dialogue position; an absent checkpoint is the default one.
    pub fn load_dialogue_checkpoint(&self) -> PandoraResult<DialogueCheckpoint> {
        Ok(DialogueCheckpoint {
            choice_made: self.parsed::<bool>(KEY_CHOICE_MADE)?.unwrap_or(false),
            chosen_branch: self.parsed::<bool>(KEY_CHOSEN_BRANCH)?.unwrap_or(false),
            line_index: self.parsed::<usize>(KEY_LINE_INDEX)?.unwrap_or(0),
            lines: self
                .backend
                .get(KEY_LINES)?
                .map(|lines| split_list(&lines, LINE_DELIMITER))
                .unwrap_or_default(),
        })
    }

    pub fn clear_dialogue_checkpoint(&mut self) -> PandoraResult<()> {
        self.backend.remove_many(DIALOGUE_KEYS)
    }

    /// Removes every saved key, run and dialogue alike.
    pub fn erase_all(&mut self) -> PandoraResult<()> {
        info!("Erasing all saved data");
        self.backend.clear()
    }

    /// Writes the run and the dialogue position in a single batch.
    pub fn save_snapshot(&mut self, snapshot: &Snapshot) -> PandoraResult<()> {
        let mut entries = run_entries(&snapshot.run)?;
        entries.extend(dialogue_entries(&snapshot.dialogue)?);
        self.backend.set_many(&entries)?;
        info!(
            "Checkpoint written: floor {}, {} curses, {} blessings",
            snapshot.run.current_floor,
            snapshot.run.active_curses.len(),
            snapshot.run.active_blessings.len()
        );
        Ok(())
    }

    pub fn load_snapshot(&self) -> PandoraResult<Snapshot> {
        Ok(Snapshot {
            run: self.load_run_state()?,
            dialogue: self.load_dialogue_checkpoint()?,
        })
    }

    fn parsed<T: FromStr>(&self, key: &str) -> PandoraResult<Option<T>> {
        match self.backend.get(key)? {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| PandoraError::CorruptSnapshot {
                    key: key.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }
}

fn run_entries(run: &RunState) -> PandoraResult<Vec<(&'static str, String)>> {
    Ok(vec![
        (KEY_GAME_STARTED, "true".to_string()),
        (KEY_FLOOR, run.current_floor.to_string()),
        (KEY_CURSES, join_list(KEY_CURSES, &run.active_curses, EFFECT_DELIMITER)?),
        (
            KEY_BLESSINGS,
            join_list(KEY_BLESSINGS, &run.active_blessings, EFFECT_DELIMITER)?,
        ),
        (KEY_HEALTH, run.player_health.to_string()),
        (KEY_MAX_HEALTH, run.player_max_health.to_string()),
    ])
}

fn dialogue_entries(dialogue: &DialogueCheckpoint) -> PandoraResult<Vec<(&'static str, String)>> {
    Ok(vec![
        (KEY_CHOICE_MADE, dialogue.choice_made.to_string()),
        (KEY_CHOSEN_BRANCH, dialogue.chosen_branch.to_string()),
        (KEY_LINE_INDEX, dialogue.line_index.to_string()),
        (KEY_LINES, join_list(KEY_LINES, &dialogue.lines, LINE_DELIMITER)?),
    ])
}

/// Joins a list, refusing items that would not survive the round trip.
fn join_list(key: &str, items: &[String], delimiter: char) -> PandoraResult<String> {
    if let Some(bad) = items
        .iter()
        .find(|item| item.is_empty() || item.contains(delimiter))
    {
        return Err(PandoraError::PersistenceUnavailable(format!(
            "cannot store {:?} under '{}'",
            bad, key
        )));
    }
    let mut joined = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            joined.push(delimiter);
        }
        joined.push_str(item);
    }
    Ok(joined)
}

fn split_list(value: &str, delimiter: char) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(delimiter).map(str::to_string).collect()
}
