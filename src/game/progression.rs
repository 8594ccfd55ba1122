//! # Progression Controller
//!
//! Sequences a run: intro and protocol choice, then for each floor a story
//! beat, one encounter, a post-victory effect, a checkpoint and a dungeon event,
//! until every floor is cleared or the player falls.
//!
//! The controller is a cooperative state machine. A scheduler calls
//! [`ProgressionController::step`] once per tick; each call polls input once,
//! services whatever the controller is waiting on (a line still being revealed,
//! or the pause after it), and otherwise performs exactly one phase transition.
//! Run state is only mutated inside a transition. Outside an encounter every
//! mutation is checkpointed before the next suspension, so the last checkpoint
//! is always a valid recovery point.

use crate::game::combat::{CombatConclusion, CombatResolver};
use crate::game::settings::GameConfig;
use crate::game::state::{DialogueCheckpoint, RunOutcome, RunState, Snapshot};
use crate::game::story;
use crate::generation::{find_effect, find_event, Dice, EffectAction, EffectSelector};
use crate::input::{Command, InputSource};
use crate::persistence::{KeyValueStore, PersistenceStore};
use crate::rendering::{Display, LineId};
use crate::{PandoraError, PandoraResult};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::time::Duration;

pub const STATUS_GAME_LOADED: &str = "Game Loaded.";
pub const STATUS_GAME_SAVED: &str = "Game Saved";
pub const STATUS_SAVE_REFUSED: &str = "Cannot save during combat.";
pub const STATUS_NOTHING_TO_SAVE: &str = "Nothing to save yet.";
pub const STATUS_STORAGE_FAILED: &str = "SNAPSHOT STORAGE FAILED";
pub const STATUS_RECOVERY_FAILED: &str = "SNAPSHOT RECOVERY FAILED";
pub const STATUS_PROTOCOL_ENGAGED: &str = "System: Protocol Engaged";
pub const STATUS_PROTOCOL_DENIED: &str = "System: Protocol Denied";

/// Where the controller is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Deciding between a fresh run and a saved one
    Bootstrapping,
    /// Intro shown, waiting for the yes/no answer
    AwaitingChoice,
    /// Playing the chosen branch one line at a time
    Dialogue,
    /// Picking up an interrupted branch from its saved line
    Resuming,
    StoryBeat,
    PreCombat,
    InCombat,
    /// Encounter won; the floor is settled on the next transition
    PostCombatEffect,
    /// Floor settled and checkpointed; its outro lines are on their way out
    CheckpointAndAdvance,
    Victory,
    Defeat,
    /// The run is over; remaining lines may still be on their way out
    Finished(RunOutcome),
}

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    Finished(RunOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    /// A line is being revealed; the pause follows once it completes
    Line { id: LineId, pause: Duration },
    Pause(Duration),
}

/// Drives a run from boot to victory, defeat or quit.
pub struct ProgressionController<D: Display, I: InputSource, S: KeyValueStore> {
    config: GameConfig,
    display: D,
    input: I,
    store: PersistenceStore<S>,
    selector: EffectSelector,
    combat: CombatResolver,
    dice: Box<dyn Dice>,
    run: RunState,
    dialogue: DialogueCheckpoint,
    phase: Phase,
    wait: Option<Wait>,
    queue: VecDeque<(String, Duration)>,
    dialogue_line_open: bool,
}

impl<D: Display, I: InputSource, S: KeyValueStore> ProgressionController<D, I, S> {
    /// Wires the controller to its collaborators.
    ///
    /// Fails if the configuration does not validate, so a missing narrative or
    /// an empty enemy roster stops the run before anything is shown.
    pub fn new(
        config: GameConfig,
        display: D,
        input: I,
        backend: S,
        dice: Box<dyn Dice>,
    ) -> PandoraResult<Self> {
        config.validate()?;

        let store = PersistenceStore::new(backend, config.player_max_health);
        let selector = EffectSelector::new(config.generation.clone());
        let run = RunState::new(config.player_max_health);

        Ok(Self {
            config,
            display,
            input,
            store,
            selector,
            combat: CombatResolver::new(),
            dice,
            run,
            dialogue: DialogueCheckpoint::default(),
            phase: Phase::Bootstrapping,
            wait: None,
            queue: VecDeque::new(),
            dialogue_line_open: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn dialogue(&self) -> &DialogueCheckpoint {
        &self.dialogue
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn combat(&self) -> &CombatResolver {
        &self.combat
    }

    /// The run's outcome once it has finished and every line has been shown.
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.status() {
            StepStatus::Finished(outcome) => Some(outcome),
            StepStatus::Running => None,
        }
    }

    /// Goes back to bootstrapping, optionally erasing every saved key first.
    ///
    /// Without erasing, the next step resumes from the last checkpoint.
    pub fn restart(&mut self, erase_saved_data: bool) -> PandoraResult<()> {
        if erase_saved_data {
            self.store.erase_all()?;
        }
        info!("Restarting (erase saved data: {})", erase_saved_data);
        self.combat.abandon();
        self.run = RunState::new(self.config.player_max_health);
        self.dialogue = DialogueCheckpoint::default();
        self.phase = Phase::Bootstrapping;
        self.wait = None;
        self.queue.clear();
        self.dialogue_line_open = false;
        Ok(())
    }

    /// Advances the run by one scheduler tick.
    ///
    /// `elapsed` is the time since the previous tick and only counts down
    /// pauses. Errors are defects (an impossible combat transition, an
    /// unscripted floor); storage failures are reported to the player instead.
    pub fn step(&mut self, elapsed: Duration) -> PandoraResult<StepStatus> {
        if let StepStatus::Finished(outcome) = self.status() {
            return Ok(StepStatus::Finished(outcome));
        }

        let mut command = self.input.poll_command();
        match command {
            Some(Command::Quit) => {
                info!("Quit requested at {:?}", self.phase);
                self.combat.abandon();
                self.queue.clear();
                self.wait = None;
                self.phase = Phase::Finished(RunOutcome::Quit);
                return Ok(StepStatus::Finished(RunOutcome::Quit));
            }
            Some(Command::Save) => {
                self.manual_save();
                command = None;
            }
            Some(Command::Skip) => {
                match self.wait {
                    Some(Wait::Line { id, .. }) => self.display.skip(id),
                    Some(Wait::Pause(_)) => self.wait = None,
                    None => {}
                }
                command = None;
            }
            _ => {}
        }

        if self.service_wait(elapsed) {
            return Ok(StepStatus::Running);
        }

        if let Some((text, pause)) = self.queue.pop_front() {
            self.present(&text, pause);
            return Ok(StepStatus::Running);
        }

        self.advance(command)?;
        Ok(self.status())
    }

    fn status(&self) -> StepStatus {
        match self.phase {
            Phase::Finished(outcome) if self.wait.is_none() && self.queue.is_empty() => {
                StepStatus::Finished(outcome)
            }
            _ => StepStatus::Running,
        }
    }

    /// Returns `true` while the controller is still blocked.
    fn service_wait(&mut self, elapsed: Duration) -> bool {
        match self.wait {
            None => false,
            Some(Wait::Line { id, pause }) => {
                if !self.display.is_complete(id) {
                    true
                } else if pause.is_zero() {
                    self.wait = None;
                    false
                } else {
                    self.wait = Some(Wait::Pause(pause));
                    true
                }
            }
            Some(Wait::Pause(remaining)) => {
                if elapsed >= remaining {
                    self.wait = None;
                    false
                } else {
                    self.wait = Some(Wait::Pause(remaining - elapsed));
                    true
                }
            }
        }
    }

    fn present(&mut self, text: &str, pause: Duration) {
        let id = self.display.show_line(text);
        self.wait = Some(Wait::Line { id, pause });
    }

    fn enqueue(&mut self, text: impl Into<String>) {
        let pause = self.config.line_pause();
        self.queue.push_back((text.into(), pause));
    }

    fn enqueue_all<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            self.enqueue(line);
        }
    }

    fn advance(&mut self, command: Option<Command>) -> PandoraResult<()> {
        match self.phase {
            Phase::Bootstrapping => self.bootstrap(),
            Phase::AwaitingChoice => self.await_choice(command),
            Phase::Resuming => {
                info!(
                    "Resuming dialogue at line {}/{}",
                    self.dialogue.line_index,
                    self.dialogue.lines.len()
                );
                self.display.show_status(STATUS_GAME_LOADED);
                self.dialogue_line_open = false;
                self.phase = Phase::Dialogue;
            }
            Phase::Dialogue => self.advance_dialogue(),
            Phase::StoryBeat => self.story_beat()?,
            Phase::PreCombat => self.pre_combat()?,
            Phase::InCombat => self.combat_turn(command)?,
            Phase::PostCombatEffect => self.post_combat_effect()?,
            Phase::CheckpointAndAdvance => self.checkpoint_and_advance(),
            Phase::Victory => {
                info!(
                    "Run won: {} curses, {} blessings",
                    self.run.active_curses.len(),
                    self.run.active_blessings.len()
                );
                self.enqueue(story::RUN_VICTORY_LINE);
                self.enqueue(self.effects_summary());
                self.phase = Phase::Finished(RunOutcome::Victory);
            }
            Phase::Defeat => {
                info!("Run lost on floor {}", self.run.current_floor);
                self.enqueue(story::RUN_DEFEAT_LINE);
                self.enqueue(format!(
                    "FLOORS CLEARED: {}",
                    self.run.current_floor.saturating_sub(1)
                ));
                self.phase = Phase::Finished(RunOutcome::Defeat);
            }
            Phase::Finished(_) => {}
        }
        Ok(())
    }

    fn bootstrap(&mut self) {
        let saved = self.store.has_saved_run().and_then(|has_saved| {
            if has_saved {
                self.store.load_snapshot().map(Some)
            } else {
                Ok(None)
            }
        });

        match saved {
            Ok(Some(snapshot)) => self.resume_from(snapshot),
            Ok(None) => self.begin_fresh_run(),
            Err(e) => {
                warn!("Could not load saved run: {}", e);
                self.display.show_status(STATUS_RECOVERY_FAILED);
                self.begin_fresh_run();
            }
        }
    }

    fn begin_fresh_run(&mut self) {
        info!("Starting a new run");
        self.run = RunState::new(self.config.player_max_health);
        self.dialogue = DialogueCheckpoint::default();
        self.enqueue_all(story::INTRO_LINES.iter().copied());
        self.phase = Phase::AwaitingChoice;
    }

    fn resume_from(&mut self, snapshot: Snapshot) {
        let Snapshot { mut run, dialogue } = snapshot;
        if run.current_floor == 0 {
            warn!("Saved floor was 0, starting from floor 1");
            run.current_floor = 1;
        }
        let vitals = run.vitals();
        run.set_vitals(vitals);

        info!(
            "Loaded saved run: floor {}, {} curses, {} blessings, {}/{} HP",
            run.current_floor,
            run.active_curses.len(),
            run.active_blessings.len(),
            run.player_health,
            run.player_max_health
        );
        self.run = run;

        if self.run.is_complete(self.config.max_floors) {
            self.dialogue = DialogueCheckpoint::default();
            self.display.show_status(STATUS_GAME_LOADED);
            self.phase = Phase::Victory;
        } else if dialogue.is_resumable() {
            self.dialogue = dialogue;
            self.phase = Phase::Resuming;
        } else {
            self.dialogue = DialogueCheckpoint::default();
            self.display.show_status(STATUS_GAME_LOADED);
            self.phase = Phase::StoryBeat;
        }
    }

    fn await_choice(&mut self, command: Option<Command>) {
        let Some(engaged) = command.and_then(Command::as_choice) else {
            return;
        };
        info!("Protocol prompt answered: {}", if engaged { "yes" } else { "no" });

        self.dialogue = DialogueCheckpoint::begin(engaged, story::branch_lines(engaged));
        self.dialogue_line_open = false;
        self.checkpoint();
        self.phase = Phase::Dialogue;
    }

    fn advance_dialogue(&mut self) {
        if self.dialogue_line_open {
            self.dialogue_line_open = false;
            self.dialogue.line_index += 1;
            if let Err(e) = self.store.save_dialogue_checkpoint(&self.dialogue) {
                self.report_storage_failure(e);
            }
        }

        if let Some(line) = self.dialogue.current_line().map(str::to_string) {
            let pause = self.config.dialogue_pause();
            self.present(&line, pause);
            self.dialogue_line_open = true;
            return;
        }

        let engaged = self.dialogue.chosen_branch;
        debug!("Dialogue branch finished ({} lines)", self.dialogue.lines.len());
        self.dialogue = DialogueCheckpoint::default();
        if let Err(e) = self.store.clear_dialogue_checkpoint() {
            self.report_storage_failure(e);
        }
        self.display.show_status(if engaged {
            STATUS_PROTOCOL_ENGAGED
        } else {
            STATUS_PROTOCOL_DENIED
        });
        self.phase = Phase::StoryBeat;
    }

    fn story_beat(&mut self) -> PandoraResult<()> {
        let floor = self.run.current_floor;
        info!("Floor {} of {}", floor, self.config.max_floors);
        let narrative = story::floor_narrative(floor).ok_or_else(|| missing_narrative(floor))?;
        self.enqueue(narrative);
        self.phase = Phase::PreCombat;
        Ok(())
    }

    fn pre_combat(&mut self) -> PandoraResult<()> {
        let floor = self.run.current_floor;
        let line = story::pre_combat_line(floor).ok_or_else(|| missing_narrative(floor))?;
        self.enqueue(line);

        let enemy = self
            .selector
            .roll_encounter_enemy(self.dice.as_mut())
            .ok_or_else(|| PandoraError::ConfigurationMissing("enemy roster is empty".into()))?;
        let encounter = self
            .combat
            .begin_encounter(floor, enemy, self.run.vitals(), self.dice.as_mut());
        let lines = [
            format!("ENCOUNTER: {}", encounter.enemy_name),
            format!(
                "PLAYER HP: {} | ENEMY HP: {}",
                encounter.player.health, encounter.enemy_health
            ),
            "[1] ATTACK   [2] DEFEND".to_string(),
        ];
        for line in lines {
            self.enqueue(line);
        }

        self.phase = Phase::InCombat;
        Ok(())
    }

    fn combat_turn(&mut self, command: Option<Command>) -> PandoraResult<()> {
        let Some(action) = command.and_then(Command::as_player_action) else {
            return Ok(());
        };

        let turn = self
            .combat
            .resolve_player_action(action, self.dice.as_mut())?;
        for line in turn.summary.lines() {
            self.enqueue(line);
        }

        if !self.combat.is_concluded() {
            return Ok(());
        }

        let report = self.combat.end_encounter()?;
        info!(
            "Floor {}: {:?} against {} after {} turns",
            self.run.current_floor, report.conclusion, report.enemy_name, report.turns
        );
        match report.conclusion {
            CombatConclusion::Won => {
                self.run.set_vitals(report.player);
                self.phase = Phase::PostCombatEffect;
            }
            CombatConclusion::Lost => self.phase = Phase::Defeat,
        }
        Ok(())
    }

    /// Settles a won floor in one transition.
    ///
    /// The effect, the floor increment and the dungeon event all land in a
    /// single checkpoint before any of the floor's outro lines are shown, so
    /// an interruption from here on resumes at the next floor.
    fn post_combat_effect(&mut self) -> PandoraResult<()> {
        let cleared = self.run.current_floor;
        if let Some(line) = story::victory_line(cleared) {
            self.enqueue(line);
        }

        let record = self
            .selector
            .roll_post_victory_effect(cleared, self.dice.as_mut());
        let (lines, action) = match find_effect(record.kind, &record.id) {
            Some(definition) => (definition.lines, definition.action),
            None => {
                warn!("{} '{}' is not registered", record.kind, record.id);
                (&[][..], EffectAction::None)
            }
        };

        info!("Floor {}: {} '{}' applied", cleared, record.kind, record.id);
        self.run.set_vitals(action.apply(self.run.vitals()));
        self.run.record_effect(record);
        self.enqueue_all(lines.iter().copied());

        self.run.current_floor += 1;
        if !self.run.is_complete(self.config.max_floors) {
            if let Some(line) = story::transition_line(cleared) {
                self.enqueue(line);
            }

            let event_id = self
                .selector
                .roll_dungeon_event(self.run.has_active_curses(), self.dice.as_mut());
            let event = find_event(&event_id).ok_or_else(|| {
                PandoraError::ConfigurationMissing(format!(
                    "event '{}' is not registered",
                    event_id
                ))
            })?;
            debug!(
                "Dungeon event '{}' between floors {} and {}",
                event.id,
                cleared,
                cleared + 1
            );
            self.run.set_vitals(event.action.apply(self.run.vitals()));
            self.enqueue_all(event.lines.iter().copied());
        }

        self.checkpoint();
        self.phase = Phase::CheckpointAndAdvance;
        Ok(())
    }

    /// Moves on once the outro of a settled floor has been shown.
    fn checkpoint_and_advance(&mut self) {
        self.phase = if self.run.is_complete(self.config.max_floors) {
            Phase::Victory
        } else {
            Phase::StoryBeat
        };
    }

    /// Writes the run and dialogue position; failures are reported, not raised.
    fn checkpoint(&mut self) -> bool {
        let snapshot = Snapshot {
            run: self.run.clone(),
            dialogue: self.dialogue.clone(),
        };
        match self.store.save_snapshot(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                self.report_storage_failure(e);
                false
            }
        }
    }

    fn report_storage_failure(&mut self, error: PandoraError) {
        warn!("Checkpoint failed, continuing unsaved: {}", error);
        self.display.show_status(STATUS_STORAGE_FAILED);
    }

    fn manual_save(&mut self) {
        let refusal = match self.phase {
            Phase::PreCombat | Phase::InCombat | Phase::PostCombatEffect => {
                Some(STATUS_SAVE_REFUSED)
            }
            Phase::Bootstrapping
            | Phase::AwaitingChoice
            | Phase::Defeat
            | Phase::Finished(_) => Some(STATUS_NOTHING_TO_SAVE),
            _ => None,
        };
        if let Some(status) = refusal {
            debug!("Manual save refused in {:?}", self.phase);
            self.display.show_status(status);
            return;
        }

        if self.checkpoint() {
            info!("Manual save at floor {}", self.run.current_floor);
            self.display.show_status(STATUS_GAME_SAVED);
        }
    }

    fn effects_summary(&self) -> String {
        format!(
            "CURSES: {} | BLESSINGS: {}",
            self.run.active_curses.len(),
            self.run.active_blessings.len()
        )
    }
}

fn missing_narrative(floor: u32) -> PandoraError {
    PandoraError::ConfigurationMissing(format!("no narrative for floor {}", floor))
}
