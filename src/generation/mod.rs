//! # Generation Module
//!
//! Random selection systems for encounters, curses, blessings and dungeon events.
//!
//! Every draw goes through the [`Dice`] trait so that the same sequence of rolls
//! can be reproduced from a seed, or fixed outright in tests. The selection logic
//! itself is pure: it reads pools and an immutable view of the run and returns a
//! new record, leaving all mutation to the progression controller.

pub mod effects;
pub mod encounters;
pub mod events;

pub use effects::*;
pub use encounters::*;
pub use events::*;

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Source of uniform random draws.
///
/// Implemented for [`StdRng`]; tests supply their own implementations to pin
/// every roll to a known value.
pub trait Dice {
    /// Draws an integer uniformly from the half-open `range`.
    ///
    /// Callers never pass an empty range.
    fn roll(&mut self, range: Range<i32>) -> i32;

    /// Draws a float uniformly from `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl Dice for StdRng {
    fn roll(&mut self, range: Range<i32>) -> i32 {
        self.gen_range(range)
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Picks one element uniformly, or `None` for an empty slice.
pub fn pick<'a, T>(dice: &mut dyn Dice, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = dice.roll(0..items.len() as i32) as usize;
    items.get(index)
}

/// Configuration for random selection.
///
/// Holds the pools every roll draws from, plus the curse-bias tuning. Pools are
/// plain id lists; ids are checked against the effect and event registries when
/// the configuration is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible runs (entropy when absent)
    pub seed: Option<u64>,
    /// Curse ids a post-victory roll may produce
    pub curse_pool: Vec<String>,
    /// Blessing ids a post-victory roll may produce
    pub blessing_pool: Vec<String>,
    /// Event ids rolled between floors
    pub generic_events: Vec<String>,
    /// Event ids rolled between floors while a curse is active
    pub cursed_events: Vec<String>,
    /// Enemy names an encounter may roll
    pub enemy_roster: Vec<String>,
    /// Curse probability on floor 1 (0.0 to 1.0)
    pub base_curse_chance: f64,
    /// Added curse probability per floor already cleared
    pub curse_chance_per_floor: f64,
    /// A secondary roll above this picks the cursed event pool
    pub cursed_event_threshold: f64,
}

impl GenerationConfig {
    /// Creates the default configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use pandora::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(Some(7));
    /// assert_eq!(config.seed, Some(7));
    /// assert_eq!(config.curse_pool.len(), 3);
    /// assert!((config.base_curse_chance - 0.30).abs() < f64::EPSILON);
    /// ```
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            curse_pool: to_ids(&[WORLD_FLOOD, WITHERING_TOUCH, REFLECTIVE_SCALES]),
            blessing_pool: to_ids(&[DIVINE_VIGOR, EAGLE_EYE, SANCTIFIED_GROUND]),
            generic_events: to_ids(&[FOUND_TRINKET, EMPTY_ROOM, WOUNDED_KNIGHT]),
            cursed_events: to_ids(&[AMBUSH, STAT_DRAIN_TRAP]),
            enemy_roster: to_ids(&["PLAGUE RATS", "CHAOS BEAST", "GLITCH ENTITY"]),
            base_curse_chance: 0.30,
            curse_chance_per_floor: 0.05,
            cursed_event_threshold: 0.7,
        }
    }

    /// Creates a configuration with every optional pool empty.
    ///
    /// Only the enemy roster is populated, since an encounter cannot be rolled
    /// without one. Useful for exercising the fallback paths.
    pub fn with_empty_pools(seed: Option<u64>) -> Self {
        Self {
            curse_pool: Vec::new(),
            blessing_pool: Vec::new(),
            generic_events: Vec::new(),
            cursed_events: Vec::new(),
            ..Self::new(seed)
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

fn to_ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Creates the run's random source from the configured seed.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Chooses enemies, post-victory effects and dungeon events.
///
/// Holds the configured pools; every roll takes the random source explicitly
/// and returns a fresh record.
#[derive(Debug, Clone)]
pub struct EffectSelector {
    config: GenerationConfig,
}

impl EffectSelector {
    /// Creates a selector over the given pools.
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// The pools this selector draws from.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Probability that the effect rolled after clearing `floor` is a curse.
    ///
    /// Grows linearly from the base chance by a fixed step per floor already
    /// cleared. Values of 1.0 or more mean the roll is always a curse; no upper
    /// clamp is applied.
    pub fn curse_chance(&self, floor: u32) -> f64 {
        let cleared = floor.saturating_sub(1) as f64;
        self.config.base_curse_chance + self.config.curse_chance_per_floor * cleared
    }

    /// Rolls the identity of the next encounter's enemy.
    pub fn roll_encounter_enemy(&self, dice: &mut dyn Dice) -> Option<EnemyProfile> {
        roll_enemy(&self.config.enemy_roster, dice)
    }

    /// Rolls the curse or blessing granted for clearing `floor`.
    ///
    /// An empty pool for the chosen branch yields the branch's fallback id.
    pub fn roll_post_victory_effect(&self, floor: u32, dice: &mut dyn Dice) -> EffectRecord {
        let kind = if dice.unit() < self.curse_chance(floor) {
            EffectKind::Curse
        } else {
            EffectKind::Blessing
        };

        let pool = match kind {
            EffectKind::Curse => &self.config.curse_pool,
            EffectKind::Blessing => &self.config.blessing_pool,
        };

        let id = match pick(dice, pool) {
            Some(id) => id.clone(),
            None => {
                warn!(
                    "{} pool is empty, falling back to '{}'",
                    kind,
                    kind.fallback_id()
                );
                kind.fallback_id().to_string()
            }
        };

        EffectRecord::new(kind, id)
    }

    /// Rolls the micro-event that plays between floors.
    ///
    /// With a curse active, a secondary roll above the threshold draws from the
    /// cursed pool; otherwise the generic pool is used. An empty pool yields the
    /// neutral "nothing happens" event.
    pub fn roll_dungeon_event(&self, has_active_curses: bool, dice: &mut dyn Dice) -> String {
        let use_cursed = has_active_curses && dice.unit() > self.config.cursed_event_threshold;
        let pool = if use_cursed {
            &self.config.cursed_events
        } else {
            &self.config.generic_events
        };

        match pick(dice, pool) {
            Some(id) => id.clone(),
            None => {
                warn!(
                    "{} event pool is empty, nothing happens",
                    if use_cursed { "cursed" } else { "generic" }
                );
                NOTHING_HAPPENS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MaxDice, MinDice, SequenceDice};
    use proptest::prelude::*;

    #[test]
    fn test_curse_chance_examples() {
        let selector = EffectSelector::new(GenerationConfig::default());
        assert!((selector.curse_chance(1) - 0.30).abs() < 1e-9);
        assert!((selector.curse_chance(3) - 0.40).abs() < 1e-9);
        assert!((selector.curse_chance(15) - 1.0).abs() < 1e-9);
        assert!(selector.curse_chance(30) > 1.0);
    }

    proptest! {
        #[test]
        fn curse_chance_never_decreases(floor in 2u32..200) {
            let selector = EffectSelector::new(GenerationConfig::default());
            prop_assert!(selector.curse_chance(floor) >= selector.curse_chance(floor - 1));
        }
    }

    #[test]
    fn test_low_roll_is_curse_high_roll_is_blessing() {
        let selector = EffectSelector::new(GenerationConfig::default());

        let curse = selector.roll_post_victory_effect(1, &mut MinDice);
        assert_eq!(curse.kind, EffectKind::Curse);
        assert_eq!(curse.id, WORLD_FLOOD);

        let blessing = selector.roll_post_victory_effect(1, &mut MaxDice);
        assert_eq!(blessing.kind, EffectKind::Blessing);
        assert_eq!(blessing.id, SANCTIFIED_GROUND);
    }

    #[test]
    fn test_always_curse_once_chance_reaches_one() {
        let selector = EffectSelector::new(GenerationConfig::default());
        let record = selector.roll_post_victory_effect(15, &mut MaxDice);
        assert_eq!(record.kind, EffectKind::Curse);
    }

    #[test]
    fn test_empty_curse_pool_falls_back() {
        let selector = EffectSelector::new(GenerationConfig::with_empty_pools(None));
        let record = selector.roll_post_victory_effect(1, &mut MinDice);
        assert_eq!(record, EffectRecord::new(EffectKind::Curse, "default_curse"));

        let record = selector.roll_post_victory_effect(1, &mut MaxDice);
        assert_eq!(
            record,
            EffectRecord::new(EffectKind::Blessing, "default_blessing")
        );
    }

    #[test]
    fn test_dungeon_event_uses_generic_pool_without_curses() {
        let selector = EffectSelector::new(GenerationConfig::default());
        // The secondary roll is skipped entirely when no curse is active.
        let mut dice = SequenceDice::new(vec![1], vec![]);
        assert_eq!(selector.roll_dungeon_event(false, &mut dice), EMPTY_ROOM);
    }

    #[test]
    fn test_dungeon_event_cursed_pool_needs_high_roll() {
        let selector = EffectSelector::new(GenerationConfig::default());

        let mut dice = SequenceDice::new(vec![0], vec![0.71]);
        assert_eq!(selector.roll_dungeon_event(true, &mut dice), AMBUSH);

        let mut dice = SequenceDice::new(vec![0], vec![0.7]);
        assert_eq!(selector.roll_dungeon_event(true, &mut dice), FOUND_TRINKET);
    }

    #[test]
    fn test_empty_event_pool_is_neutral() {
        let selector = EffectSelector::new(GenerationConfig::with_empty_pools(None));
        assert_eq!(selector.roll_dungeon_event(true, &mut MaxDice), NOTHING_HAPPENS);
        assert_eq!(selector.roll_dungeon_event(false, &mut MinDice), NOTHING_HAPPENS);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = GenerationConfig::new(Some(12345));
        let mut first = create_rng(&config);
        let mut second = create_rng(&config);
        for _ in 0..20 {
            assert_eq!(first.roll(50..99), second.roll(50..99));
        }
    }

    #[test]
    fn test_pick_empty_slice() {
        let empty: [String; 0] = [];
        assert!(pick(&mut MaxDice, &empty).is_none());
        assert_eq!(pick(&mut MaxDice, &[1, 2, 3]), Some(&3));
    }
}
