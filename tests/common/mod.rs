//! Shared helpers for integration tests.

#![allow(dead_code)]

use pandora::{
    Command, Dice, GameConfig, KeyValueStore, MemoryStore, PandoraError, PandoraResult,
    ProgressionController, RunOutcome, ScriptedInput, StepStatus, TranscriptDisplay,
};
use std::ops::Range;
use std::time::Duration;

/// Every roll lands on the top of its range; never rolls a curse.
pub struct TopDice;

impl Dice for TopDice {
    fn roll(&mut self, range: Range<i32>) -> i32 {
        range.end - 1
    }

    fn unit(&mut self) -> f64 {
        0.999_999
    }
}

/// Every roll lands on the bottom of its range; always rolls a curse.
pub struct BottomDice;

impl Dice for BottomDice {
    fn roll(&mut self, range: Range<i32>) -> i32 {
        range.start
    }

    fn unit(&mut self) -> f64 {
        0.0
    }
}

/// Reads succeed with nothing stored; every write fails.
#[derive(Debug, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> PandoraResult<Option<String>> {
        Ok(None)
    }

    fn set_many(&mut self, _entries: &[(&str, String)]) -> PandoraResult<()> {
        Err(PandoraError::PersistenceUnavailable("disk full".to_string()))
    }

    fn remove_many(&mut self, _keys: &[&str]) -> PandoraResult<()> {
        Err(PandoraError::PersistenceUnavailable("disk full".to_string()))
    }

    fn clear(&mut self) -> PandoraResult<()> {
        Err(PandoraError::PersistenceUnavailable("disk full".to_string()))
    }
}

pub type Controller<S> = ProgressionController<TranscriptDisplay, ScriptedInput, S>;

/// Autopilot that answers the prompt with `choice` and otherwise attacks.
pub fn autopilot(choice: Command) -> ScriptedInput {
    ScriptedInput::new().with_cycle(vec![choice, Command::Attack])
}

pub fn controller<S: KeyValueStore>(
    store: S,
    input: ScriptedInput,
    dice: Box<dyn Dice>,
) -> Controller<S> {
    ProgressionController::new(
        GameConfig::for_testing(None),
        TranscriptDisplay::new(),
        input,
        store,
        dice,
    )
    .expect("default configuration is valid")
}

pub fn memory_controller(dice: Box<dyn Dice>) -> Controller<MemoryStore> {
    controller(MemoryStore::new(), autopilot(Command::ChoiceYes), dice)
}

/// Steps until the run finishes.
pub fn run_to_end<S: KeyValueStore>(controller: &mut Controller<S>) -> RunOutcome {
    for _ in 0..100_000 {
        if let StepStatus::Finished(outcome) = controller.step(Duration::from_millis(16)).unwrap() {
            return outcome;
        }
    }
    panic!("run never finished");
}

/// Steps until `done` holds after a step.
pub fn run_until<S, F>(controller: &mut Controller<S>, mut done: F)
where
    S: KeyValueStore,
    F: FnMut(&Controller<S>) -> bool,
{
    for _ in 0..100_000 {
        controller.step(Duration::from_millis(16)).unwrap();
        if done(&*controller) {
            return;
        }
    }
    panic!("controller never reached the expected state");
}

/// Saved store holding a run at `floor` with the given health.
pub fn saved_run(floor: u32, health: i32, max_health: i32) -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .set_many(&[
            ("pandora.game_started", "true".to_string()),
            ("run.floor", floor.to_string()),
            ("run.curses", String::new()),
            ("run.blessings", String::new()),
            ("run.health", health.to_string()),
            ("run.max_health", max_health.to_string()),
        ])
        .unwrap();
    store
}
