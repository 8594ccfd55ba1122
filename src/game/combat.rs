//! # Combat Module
//!
//! Turn-based resolution of a single encounter.
//!
//! An encounter is created when a floor's fight begins and dropped once it
//! concludes. It is never persisted: a run interrupted mid-fight restarts that
//! floor's encounter from the beginning.

use crate::game::Vitals;
use crate::generation::{Dice, EnemyProfile};
use crate::{PandoraError, PandoraResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Enemy starting health, drawn uniformly.
pub const ENEMY_HEALTH_RANGE: Range<i32> = 50..99;
/// Damage dealt by a player attack.
pub const PLAYER_ATTACK_RANGE: Range<i32> = 10..20;
/// Health recovered by defending.
pub const DEFEND_HEAL_RANGE: Range<i32> = 5..11;
/// Enemy retaliation after the player attacked.
pub const RETALIATION_RANGE: Range<i32> = 5..15;
/// Enemy retaliation after the player defended.
pub const MITIGATED_RETALIATION_RANGE: Range<i32> = 3..10;

/// A player's combat choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Attack,
    Defend,
}

impl PlayerAction {
    /// Damage range of the enemy's answer to this action.
    pub fn retaliation_range(self) -> Range<i32> {
        match self {
            PlayerAction::Attack => RETALIATION_RANGE,
            PlayerAction::Defend => MITIGATED_RETALIATION_RANGE,
        }
    }
}

/// Where the resolver is in an encounter's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    /// No encounter has started
    Init,
    AwaitingPlayerInput,
    Resolving,
    Concluded,
}

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatConclusion {
    Won,
    Lost,
}

/// State of the encounter in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterState {
    pub floor: u32,
    pub enemy_name: String,
    pub enemy_health: i32,
    pub enemy_max_health: i32,
    pub art_index: usize,
    /// Player health as it changes during the fight
    pub player: Vitals,
    pub turns: u32,
}

/// What happened during one player turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub action: PlayerAction,
    /// Damage the player dealt (0 when defending)
    pub damage_dealt: i32,
    /// Health the player recovered (0 when attacking)
    pub healed: i32,
    /// Damage the enemy dealt back, if it got a turn
    pub retaliation: Option<i32>,
    pub player_health: i32,
    pub enemy_health: i32,
    pub conclusion: Option<CombatConclusion>,
    /// Human-readable summary for the display
    pub summary: String,
}

/// Final result handed back to the progression controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterReport {
    pub enemy_name: String,
    pub conclusion: CombatConclusion,
    pub player: Vitals,
    pub turns: u32,
}

/// Owns one encounter's turn loop.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    phase: CombatPhase,
    encounter: Option<EncounterState>,
    conclusion: Option<CombatConclusion>,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatResolver {
    pub fn new() -> Self {
        Self {
            phase: CombatPhase::Init,
            encounter: None,
            conclusion: None,
        }
    }

    /// Starts a new encounter, discarding any previous one.
    ///
    /// The enemy's health is rolled here; its identity comes from the caller.
    pub fn begin_encounter(
        &mut self,
        floor: u32,
        enemy: EnemyProfile,
        player: Vitals,
        dice: &mut dyn Dice,
    ) -> &EncounterState {
        let enemy_health = dice.roll(ENEMY_HEALTH_RANGE);
        info!(
            "Floor {}: encounter with {} ({} HP)",
            floor, enemy.name, enemy_health
        );

        self.phase = CombatPhase::AwaitingPlayerInput;
        self.conclusion = None;
        self.encounter.insert(EncounterState {
            floor,
            enemy_name: enemy.name,
            enemy_health,
            enemy_max_health: enemy_health,
            art_index: enemy.art_index,
            player,
            turns: 0,
        })
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn encounter(&self) -> Option<&EncounterState> {
        self.encounter.as_ref()
    }

    pub fn is_concluded(&self) -> bool {
        self.phase == CombatPhase::Concluded
    }

    /// Whether the player won; `false` until the encounter concludes.
    pub fn did_player_win(&self) -> bool {
        self.conclusion == Some(CombatConclusion::Won)
    }

    /// Resolves one player turn and, unless the enemy fell, its retaliation.
    ///
    /// Fails with [`PandoraError::InvalidStateTransition`] when no encounter is
    /// awaiting input.
    pub fn resolve_player_action(
        &mut self,
        action: PlayerAction,
        dice: &mut dyn Dice,
    ) -> PandoraResult<TurnResult> {
        if self.phase != CombatPhase::AwaitingPlayerInput {
            return Err(PandoraError::InvalidStateTransition(format!(
                "cannot resolve {:?} while combat is {:?}",
                action, self.phase
            )));
        }
        let encounter = self.encounter.as_mut().ok_or_else(|| {
            PandoraError::InvalidStateTransition("no encounter in progress".to_string())
        })?;

        self.phase = CombatPhase::Resolving;
        encounter.turns += 1;

        let mut damage_dealt = 0;
        let mut healed = 0;
        let mut lines = Vec::new();

        match action {
            PlayerAction::Attack => {
                damage_dealt = dice.roll(PLAYER_ATTACK_RANGE);
                encounter.enemy_health = (encounter.enemy_health - damage_dealt).max(0);
                lines.push(format!("YOU DEALT {} DAMAGE!", damage_dealt));
            }
            PlayerAction::Defend => {
                let before = encounter.player.health;
                let roll = dice.roll(DEFEND_HEAL_RANGE);
                encounter.player.health = (before + roll).min(encounter.player.max_health);
                healed = encounter.player.health - before;
                lines.push(format!("YOU DEFEND AND RECOVER {} HP!", healed));
            }
        }

        let mut retaliation = None;
        let conclusion = if encounter.enemy_health == 0 {
            lines.push(format!("{} FALLS!", encounter.enemy_name));
            Some(CombatConclusion::Won)
        } else {
            let damage = dice.roll(action.retaliation_range());
            encounter.player.health = (encounter.player.health - damage).max(0);
            retaliation = Some(damage);
            lines.push(format!("{} HITS YOU FOR {}!", encounter.enemy_name, damage));
            if !encounter.player.is_alive() {
                Some(CombatConclusion::Lost)
            } else {
                None
            }
        };

        lines.push(format!(
            "PLAYER HP: {} | ENEMY HP: {}",
            encounter.player.health, encounter.enemy_health
        ));
        debug!(
            "Turn {}: {:?} dealt {} healed {} took {:?} -> player {} enemy {}",
            encounter.turns,
            action,
            damage_dealt,
            healed,
            retaliation,
            encounter.player.health,
            encounter.enemy_health
        );

        let result = TurnResult {
            action,
            damage_dealt,
            healed,
            retaliation,
            player_health: encounter.player.health,
            enemy_health: encounter.enemy_health,
            conclusion,
            summary: lines.join("\n"),
        };

        match conclusion {
            Some(outcome) => {
                info!("Encounter with {} ended: {:?}", encounter.enemy_name, outcome);
                self.phase = CombatPhase::Concluded;
                self.conclusion = Some(outcome);
            }
            None => self.phase = CombatPhase::AwaitingPlayerInput,
        }

        Ok(result)
    }

    /// Tears down a concluded encounter and reports its result.
    pub fn end_encounter(&mut self) -> PandoraResult<EncounterReport> {
        let conclusion = match (self.phase, self.conclusion) {
            (CombatPhase::Concluded, Some(conclusion)) => conclusion,
            _ => {
                return Err(PandoraError::InvalidStateTransition(format!(
                    "cannot end an encounter while combat is {:?}",
                    self.phase
                )))
            }
        };
        let encounter = self.encounter.take().ok_or_else(|| {
            PandoraError::InvalidStateTransition("no encounter to end".to_string())
        })?;

        self.phase = CombatPhase::Init;
        self.conclusion = None;

        Ok(EncounterReport {
            enemy_name: encounter.enemy_name,
            conclusion,
            player: encounter.player,
            turns: encounter.turns,
        })
    }

    /// Drops any encounter in progress without a result.
    pub fn abandon(&mut self) {
        self.phase = CombatPhase::Init;
        self.encounter = None;
        self.conclusion = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MaxDice, MinDice, SequenceDice};
    use proptest::prelude::*;

    fn enemy() -> EnemyProfile {
        EnemyProfile {
            name: "CHAOS BEAST".to_string(),
            art_index: 1,
        }
    }

    fn started(player: Vitals, dice: &mut dyn Dice) -> CombatResolver {
        let mut combat = CombatResolver::new();
        combat.begin_encounter(1, enemy(), player, dice);
        combat
    }

    #[test]
    fn test_begin_encounter_rolls_health() {
        let combat = started(Vitals::full(100), &mut MaxDice);
        let encounter = combat.encounter().unwrap();
        assert_eq!(encounter.enemy_health, 98);
        assert_eq!(encounter.enemy_max_health, 98);
        assert_eq!(encounter.art_index, 1);
        assert_eq!(combat.phase(), CombatPhase::AwaitingPlayerInput);
        assert!(!combat.is_concluded());
    }

    #[test]
    fn test_max_rolls_kill_in_six_attacks() {
        let mut dice = MaxDice;
        let mut combat = started(Vitals::full(100), &mut dice);

        let mut enemy_health = Vec::new();
        let mut player_health = Vec::new();
        while !combat.is_concluded() {
            let turn = combat
                .resolve_player_action(PlayerAction::Attack, &mut dice)
                .unwrap();
            enemy_health.push(turn.enemy_health);
            player_health.push(turn.player_health);
        }

        assert_eq!(enemy_health, vec![79, 60, 41, 22, 3, 0]);
        assert_eq!(player_health, vec![86, 72, 58, 44, 30, 30]);
        assert!(combat.did_player_win());
    }

    #[test]
    fn test_killing_blow_skips_retaliation() {
        let mut dice = SequenceDice::new(vec![50, 19], vec![]);
        let mut combat = started(Vitals::full(100), &mut dice);
        combat.encounter.as_mut().unwrap().enemy_health = 12;

        let turn = combat
            .resolve_player_action(PlayerAction::Attack, &mut dice)
            .unwrap();
        assert_eq!(turn.enemy_health, 0);
        assert_eq!(turn.retaliation, None);
        assert_eq!(turn.player_health, 100);
        assert_eq!(turn.conclusion, Some(CombatConclusion::Won));
    }

    #[test]
    fn test_defend_heals_then_takes_mitigated_hit() {
        let mut dice = SequenceDice::new(vec![70, 10, 9], vec![]);
        let mut combat = started(Vitals::new(50, 100), &mut dice);

        let turn = combat
            .resolve_player_action(PlayerAction::Defend, &mut dice)
            .unwrap();
        assert_eq!(turn.healed, 10);
        assert_eq!(turn.retaliation, Some(9));
        assert_eq!(turn.player_health, 51);
        assert_eq!(turn.enemy_health, 70);
        assert!(turn.summary.contains("PLAYER HP: 51 | ENEMY HP: 70"));
    }

    #[test]
    fn test_defend_heal_is_capped() {
        let mut dice = MaxDice;
        let mut combat = started(Vitals::new(97, 100), &mut dice);
        let turn = combat
            .resolve_player_action(PlayerAction::Defend, &mut dice)
            .unwrap();
        assert_eq!(turn.healed, 3);
        assert_eq!(turn.player_health, 100 - 9);
    }

    #[test]
    fn test_retaliation_can_end_in_defeat() {
        let mut dice = MaxDice;
        let mut combat = started(Vitals::new(10, 100), &mut dice);
        let turn = combat
            .resolve_player_action(PlayerAction::Attack, &mut dice)
            .unwrap();
        assert_eq!(turn.player_health, 0);
        assert_eq!(turn.conclusion, Some(CombatConclusion::Lost));
        assert!(combat.is_concluded());
        assert!(!combat.did_player_win());

        let report = combat.end_encounter().unwrap();
        assert_eq!(report.conclusion, CombatConclusion::Lost);
        assert_eq!(report.player, Vitals::new(0, 100));
        assert!(combat.encounter().is_none());
    }

    #[test]
    fn test_resolving_after_conclusion_is_an_error() {
        let mut dice = MaxDice;
        let mut combat = started(Vitals::new(1, 100), &mut dice);
        combat
            .resolve_player_action(PlayerAction::Attack, &mut dice)
            .unwrap();
        assert!(matches!(
            combat.resolve_player_action(PlayerAction::Attack, &mut dice),
            Err(PandoraError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_resolving_without_encounter_is_an_error() {
        let mut combat = CombatResolver::new();
        assert!(combat
            .resolve_player_action(PlayerAction::Defend, &mut MinDice)
            .is_err());
        assert!(combat.end_encounter().is_err());
    }

    #[test]
    fn test_end_encounter_requires_conclusion() {
        let mut combat = started(Vitals::full(100), &mut MinDice);
        assert!(combat.end_encounter().is_err());
        combat.abandon();
        assert_eq!(combat.phase(), CombatPhase::Init);
    }

    proptest! {
        #[test]
        fn attacks_never_raise_enemy_health(seed in any::<u64>(), turns in 1usize..12) {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let mut combat = started(Vitals::full(1000), &mut rng);
            let mut last = combat.encounter().unwrap().enemy_health;

            for _ in 0..turns {
                if combat.is_concluded() {
                    break;
                }
                let turn = combat.resolve_player_action(PlayerAction::Attack, &mut rng).unwrap();
                prop_assert!(turn.enemy_health <= last);
                prop_assert!(turn.enemy_health >= 0);
                if turn.enemy_health == 0 {
                    prop_assert_eq!(turn.retaliation, None);
                    prop_assert_eq!(turn.conclusion, Some(CombatConclusion::Won));
                } else {
                    let hit = turn.retaliation.unwrap();
                    prop_assert!(RETALIATION_RANGE.contains(&hit));
                }
                last = turn.enemy_health;
            }
        }

        #[test]
        fn defending_stays_within_bounds(seed in any::<u64>(), start in 1i32..=100, turns in 1usize..20) {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let mut combat = started(Vitals::new(start, 100), &mut rng);

            for _ in 0..turns {
                if combat.is_concluded() {
                    break;
                }
                let turn = combat.resolve_player_action(PlayerAction::Defend, &mut rng).unwrap();
                prop_assert!(turn.player_health <= 100);
                prop_assert!(turn.player_health >= 0);
                let hit = turn.retaliation.unwrap();
                prop_assert!(MITIGATED_RETALIATION_RANGE.contains(&hit));
            }
        }
    }
}
