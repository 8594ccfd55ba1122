//! # Curses and Blessings
//!
//! The registry of permanent run effects. Each id maps to a tagged
//! [`EffectAction`] and the lines shown when it takes hold, so configuration can
//! be checked up front and applying an effect never depends on matching strings
//! at runtime.

use crate::game::Vitals;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const WORLD_FLOOD: &str = "world_flood";
pub const WITHERING_TOUCH: &str = "withering_touch";
pub const REFLECTIVE_SCALES: &str = "reflective_scales";
pub const DIVINE_VIGOR: &str = "divine_vigor";
pub const EAGLE_EYE: &str = "eagle_eye";
pub const SANCTIFIED_GROUND: &str = "sanctified_ground";
pub const DEFAULT_CURSE: &str = "default_curse";
pub const DEFAULT_BLESSING: &str = "default_blessing";

/// Lowest max health any effect can leave the player with.
pub const MIN_MAX_HEALTH: i32 = 10;

/// Whether an effect hurts or helps the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Curse,
    Blessing,
}

impl EffectKind {
    /// Id used when this kind's pool is empty.
    pub fn fallback_id(self) -> &'static str {
        match self {
            EffectKind::Curse => DEFAULT_CURSE,
            EffectKind::Blessing => DEFAULT_BLESSING,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectKind::Curse => write!(f, "curse"),
            EffectKind::Blessing => write!(f, "blessing"),
        }
    }
}

/// One rolled effect, as appended to the run's curse or blessing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRecord {
    pub kind: EffectKind,
    pub id: String,
}

impl EffectRecord {
    pub fn new(kind: EffectKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// What an effect or event does to the player's health.
///
/// Applied as a pure function over [`Vitals`]. Outside combat nothing may kill
/// the player, so wounds stop at 1 HP, and max health never drops below
/// [`MIN_MAX_HEALTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectAction {
    /// Flavour only
    None,
    /// Raise or lower max health; current health is clamped to the new max
    AdjustMaxHealth(i32),
    /// Restore up to `n` health
    Heal(i32),
    /// Lose up to `n` health, never below 1
    Wound(i32),
    /// Restore health to max
    RestoreFull,
}

impl EffectAction {
    /// Returns the vitals after this action.
    ///
    /// # Examples
    ///
    /// ```
    /// use pandora::{EffectAction, Vitals};
    ///
    /// let vitals = Vitals::new(40, 100);
    /// assert_eq!(EffectAction::Heal(10).apply(vitals), Vitals::new(50, 100));
    /// assert_eq!(EffectAction::Wound(60).apply(vitals), Vitals::new(1, 100));
    /// assert_eq!(EffectAction::AdjustMaxHealth(-70).apply(vitals), Vitals::new(30, 30));
    /// ```
    pub fn apply(self, vitals: Vitals) -> Vitals {
        match self {
            EffectAction::None => vitals,
            EffectAction::AdjustMaxHealth(delta) => {
                let max_health = (vitals.max_health + delta).max(MIN_MAX_HEALTH);
                let health = if delta > 0 {
                    vitals.health + delta
                } else {
                    vitals.health
                };
                Vitals::new(health.min(max_health), max_health)
            }
            EffectAction::Heal(amount) => Vitals::new(
                (vitals.health + amount.max(0)).min(vitals.max_health),
                vitals.max_health,
            ),
            EffectAction::Wound(amount) => {
                Vitals::new((vitals.health - amount.max(0)).max(1), vitals.max_health)
            }
            EffectAction::RestoreFull => Vitals::new(vitals.max_health, vitals.max_health),
        }
    }
}

/// A registered curse or blessing.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDefinition {
    pub id: &'static str,
    pub kind: EffectKind,
    /// Lines shown when the effect takes hold
    pub lines: &'static [&'static str],
    pub action: EffectAction,
}

const EFFECTS: &[EffectDefinition] = &[
    EffectDefinition {
        id: WORLD_FLOOD,
        kind: EffectKind::Curse,
        lines: &[
            "CURSE: WORLD FLOOD - Movement feels sluggish!",
            "~~~ Slowly rising water appears... ~~~",
            "!!! Movement becomes sluggish !!!",
            "Enemies adapt to the flooded environment",
        ],
        action: EffectAction::None,
    },
    EffectDefinition {
        id: WITHERING_TOUCH,
        kind: EffectKind::Curse,
        lines: &["CURSE: WITHERING TOUCH - Your vitality feels drained!"],
        action: EffectAction::AdjustMaxHealth(-10),
    },
    EffectDefinition {
        id: REFLECTIVE_SCALES,
        kind: EffectKind::Curse,
        lines: &["CURSE: REFLECTIVE SCALES - Physical attacks sometimes backfire!"],
        action: EffectAction::Wound(5),
    },
    EffectDefinition {
        id: DIVINE_VIGOR,
        kind: EffectKind::Blessing,
        lines: &["BLESSING: DIVINE VIGOR - You feel a surge of resilience!"],
        action: EffectAction::AdjustMaxHealth(10),
    },
    EffectDefinition {
        id: EAGLE_EYE,
        kind: EffectKind::Blessing,
        lines: &["BLESSING: EAGLE EYE - Your focus sharpens!"],
        action: EffectAction::Heal(10),
    },
    EffectDefinition {
        id: SANCTIFIED_GROUND,
        kind: EffectKind::Blessing,
        lines: &["BLESSING: SANCTIFIED GROUND - A brief moment of calm washes over you."],
        action: EffectAction::RestoreFull,
    },
    EffectDefinition {
        id: DEFAULT_CURSE,
        kind: EffectKind::Curse,
        lines: &["CURSE: The Box mutters something you cannot make out."],
        action: EffectAction::None,
    },
    EffectDefinition {
        id: DEFAULT_BLESSING,
        kind: EffectKind::Blessing,
        lines: &["BLESSING: A faint warmth lingers, then fades."],
        action: EffectAction::None,
    },
];

/// Looks up a registered effect by id and kind.
pub fn find_effect(kind: EffectKind, id: &str) -> Option<&'static EffectDefinition> {
    EFFECTS
        .iter()
        .find(|effect| effect.kind == kind && effect.id == id)
}

/// All registered effects.
pub fn registered_effects() -> &'static [EffectDefinition] {
    EFFECTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_are_registered() {
        assert!(find_effect(EffectKind::Curse, DEFAULT_CURSE).is_some());
        assert!(find_effect(EffectKind::Blessing, DEFAULT_BLESSING).is_some());
    }

    #[test]
    fn test_lookup_respects_kind() {
        assert!(find_effect(EffectKind::Curse, WORLD_FLOOD).is_some());
        assert!(find_effect(EffectKind::Blessing, WORLD_FLOOD).is_none());
        assert!(find_effect(EffectKind::Curse, "no_such_curse").is_none());
    }

    #[test]
    fn test_every_effect_has_lines() {
        for effect in registered_effects() {
            assert!(!effect.lines.is_empty(), "{} has no lines", effect.id);
            assert!(!effect.id.contains(','), "{} contains the list delimiter", effect.id);
        }
    }

    #[test]
    fn test_withering_touch_clamps_health() {
        let vitals = Vitals::new(100, 100);
        let after = EffectAction::AdjustMaxHealth(-10).apply(vitals);
        assert_eq!(after, Vitals::new(90, 90));
    }

    #[test]
    fn test_max_health_has_a_floor() {
        let vitals = Vitals::new(12, 15);
        let after = EffectAction::AdjustMaxHealth(-10).apply(vitals);
        assert_eq!(after, Vitals::new(10, MIN_MAX_HEALTH));
    }

    #[test]
    fn test_divine_vigor_grows_both() {
        let vitals = Vitals::new(50, 100);
        assert_eq!(
            EffectAction::AdjustMaxHealth(10).apply(vitals),
            Vitals::new(60, 110)
        );
    }

    #[test]
    fn test_heal_and_restore_respect_max() {
        let vitals = Vitals::new(95, 100);
        assert_eq!(EffectAction::Heal(10).apply(vitals), Vitals::new(100, 100));
        assert_eq!(
            EffectAction::RestoreFull.apply(Vitals::new(3, 80)),
            Vitals::new(80, 80)
        );
    }

    #[test]
    fn test_wound_never_kills() {
        assert_eq!(EffectAction::Wound(5).apply(Vitals::new(3, 100)), Vitals::new(1, 100));
        assert_eq!(EffectAction::Wound(5).apply(Vitals::new(30, 100)), Vitals::new(25, 100));
    }
}
