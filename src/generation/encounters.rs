//! # Encounter Generation
//!
//! Rolls which enemy guards a floor and which art frame represents it.

use crate::generation::{pick, Dice};
use serde::{Deserialize, Serialize};

/// Identity of a rolled enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Display name, e.g. "CHAOS BEAST"
    pub name: String,
    /// Index into the art roster, drawn independently of the name
    pub art_index: usize,
}

/// Rolls an enemy from the roster.
///
/// The name and the art index are two independent uniform draws over the same
/// roster. Returns `None` only for an empty roster, which configuration
/// validation rejects before a run starts.
pub fn roll_enemy(roster: &[String], dice: &mut dyn Dice) -> Option<EnemyProfile> {
    if roster.is_empty() {
        return None;
    }
    let art_index = dice.roll(0..roster.len() as i32) as usize;
    let name = pick(dice, roster)?.clone();
    Some(EnemyProfile { name, art_index })
}
