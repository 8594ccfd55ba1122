//! Scripted input for headless runs and tests.

use super::{Command, InputSource};
use log::warn;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Replays queued commands, then optionally repeats a fixed cycle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<Command>,
    cycle: Vec<Command>,
    cycle_index: usize,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that plays `commands` once and then goes quiet.
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            queue: commands.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Parses a compact script, one command per character.
    ///
    /// Newlines are ignored, and a `#` starts a comment running to the end of
    /// the line. Unknown characters are skipped with a warning.
    pub fn from_script(script: &str) -> Self {
        let mut queue = VecDeque::new();
        for line in script.lines() {
            let line = line.split('#').next().unwrap_or("");
            for c in line.chars() {
                match Command::from_script_char(c) {
                    Some(command) => queue.push_back(command),
                    None if c == '\t' || c == '\r' => {}
                    None => warn!("Unknown command in script: {:?}", c),
                }
            }
        }
        Self {
            queue,
            ..Self::default()
        }
    }

    /// Reads a script file; see [`ScriptedInput::from_script`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::from_script(&fs::read_to_string(path)?))
    }

    /// Sets commands to repeat forever once the queue runs dry.
    pub fn with_cycle(mut self, cycle: Vec<Command>) -> Self {
        self.cycle = cycle;
        self.cycle_index = 0;
        self
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Commands still queued, not counting the cycle.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_command(&mut self) -> Option<Command> {
        if let Some(command) = self.queue.pop_front() {
            return Some(command);
        }
        if self.cycle.is_empty() {
            return None;
        }
        let command = self.cycle[self.cycle_index % self.cycle.len()];
        self.cycle_index = (self.cycle_index + 1) % self.cycle.len();
        Some(command)
    }
}
