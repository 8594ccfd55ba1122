//! # Dungeon Events
//!
//! Small happenings between floors. Like curses and blessings, each event id is
//! registered with its lines and a tagged [`EffectAction`].

use crate::generation::EffectAction;

pub const FOUND_TRINKET: &str = "found_trinket";
pub const EMPTY_ROOM: &str = "empty_room";
pub const WOUNDED_KNIGHT: &str = "wounded_knight";
pub const AMBUSH: &str = "ambush";
pub const STAT_DRAIN_TRAP: &str = "stat_drain_trap";
pub const NOTHING_HAPPENS: &str = "nothing_happens";

/// Which pool an event may be configured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPool {
    Generic,
    Cursed,
    /// Only produced as the empty-pool result
    Neutral,
}

/// A registered dungeon event.
#[derive(Debug, Clone, PartialEq)]
pub struct DungeonEvent {
    pub id: &'static str,
    pub pool: EventPool,
    pub lines: &'static [&'static str],
    pub action: EffectAction,
}

const EVENTS: &[DungeonEvent] = &[
    DungeonEvent {
        id: FOUND_TRINKET,
        pool: EventPool::Generic,
        lines: &["You found a small, shiny trinket on the ground!"],
        action: EffectAction::Heal(5),
    },
    DungeonEvent {
        id: EMPTY_ROOM,
        pool: EventPool::Generic,
        lines: &["This room is eerily quiet and empty."],
        action: EffectAction::None,
    },
    DungeonEvent {
        id: WOUNDED_KNIGHT,
        pool: EventPool::Generic,
        lines: &[
            "A wounded knight blocks your path!",
            "You shove the knight aside, taking some damage in the scuffle.",
        ],
        action: EffectAction::Wound(5),
    },
    DungeonEvent {
        id: AMBUSH,
        pool: EventPool::Cursed,
        lines: &[
            "It's an ambush! Enemies appear!",
            "You fight your way clear, bleeding.",
        ],
        action: EffectAction::Wound(10),
    },
    DungeonEvent {
        id: STAT_DRAIN_TRAP,
        pool: EventPool::Cursed,
        lines: &["You feel a draining sensation... A curse saps your strength!"],
        action: EffectAction::AdjustMaxHealth(-5),
    },
    DungeonEvent {
        id: NOTHING_HAPPENS,
        pool: EventPool::Neutral,
        lines: &["The air is still... nothing happens."],
        action: EffectAction::None,
    },
];

/// Looks up a registered event by id.
pub fn find_event(id: &str) -> Option<&'static DungeonEvent> {
    EVENTS.iter().find(|event| event.id == id)
}

/// All registered events.
pub fn registered_events() -> &'static [DungeonEvent] {
    EVENTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_event_registered() {
        let event = find_event(NOTHING_HAPPENS).unwrap();
        assert_eq!(event.pool, EventPool::Neutral);
        assert_eq!(event.action, EffectAction::None);
    }

    #[test]
    fn test_pools_are_disjoint() {
        assert_eq!(find_event(AMBUSH).unwrap().pool, EventPool::Cursed);
        assert_eq!(find_event(FOUND_TRINKET).unwrap().pool, EventPool::Generic);
        assert!(find_event("dragon_hoard").is_none());
    }

    #[test]
    fn test_every_event_has_lines() {
        for event in registered_events() {
            assert!(!event.lines.is_empty(), "{} has no lines", event.id);
        }
    }
}
