//! # Story Content
//!
//! Fixed narrative text. Floor lines are a static lookup keyed by floor number.

/// Lines played once at the start of a fresh run. The last one is the prompt.
pub const INTRO_LINES: &[&str] = &[
    "SYSTEM BOOTING...",
    "ACCESSING ARCHIVE :: PANDORA.BOX",
    "WARNING: CORE INTEGRITY COMPROMISED. CONTAINMENT FIELD FLUCTUATING.",
    "INITIATING INTERFACE...",
    "Welcome, User.",
    "CRITICAL ALERT: ARTIFACT STABILITY AT 12%",
    "CONTAINMENT BREACH IMMINENT. ACTIVATE PROTOCOLS?",
    "USER AUTHORIZATION REQUIRED...",
    "SCANNING BIOMETRICS...",
    "ACCESS GRANTED: USER LEVEL DELTA",
    "WARNING: PROTOCOL ACTIVATION MAY ACCELERATE CORE FAILURE",
    "CHOOSE WISELY... [PRESS Y/N]",
];

/// Branch played after answering yes.
pub const PROTOCOL_ENGAGED_LINES: &[&str] = &[
    "PROTOCOLS ENGAGED.",
    "CONTAINMENT FIELD STABILIZING...",
    "WARNING: UNKNOWN ENTITY DETECTED IN CORE!",
];

/// Branch played after answering no.
pub const PROTOCOL_DENIED_LINES: &[&str] = &[
    "PROTOCOLS DENIED.",
    "CONTAINMENT FIELD COLLAPSING...",
    "ENTITY RELEASE INEVITABLE.",
];

struct FloorScript {
    narrative: &'static str,
    pre_combat: &'static str,
    victory: &'static str,
    transition: &'static str,
}

const FLOORS: &[FloorScript] = &[
    FloorScript {
        narrative: "DEPTH 1 :: The lid gives way. Cold air rises from the Box.",
        pre_combat: "Something skitters in the dark between the hinges...",
        victory: "The first guardian dissolves into static.",
        transition: "A stairway of green glyphs unfolds beneath you.",
    },
    FloorScript {
        narrative: "DEPTH 2 :: The walls bleed... you see it too?",
        pre_combat: "A shape tears itself loose from the wall.",
        victory: "The shape collapses back into the stone.",
        transition: "The glyphs flicker. Further down, something is waiting.",
    },
    FloorScript {
        narrative: "DEPTH 3 :: The Box hungers... feed it.",
        pre_combat: "The floor splits and something climbs out.",
        victory: "The hunger quiets, for now.",
        transition: "You hear your own footsteps a second too late.",
    },
    FloorScript {
        narrative: "DEPTH 4 :: I've seen your fate - it ends in fire.",
        pre_combat: "Heat blooms ahead. It has been expecting you.",
        victory: "Ash settles where it stood.",
        transition: "Seek the blue flame. It is close now.",
    },
    FloorScript {
        narrative: "DEPTH 5 :: The core. The blue flame burns at its heart.",
        pre_combat: "The last guardian unfolds from the flame.",
        victory: "The flame gutters. The core falls silent.",
        transition: "There is nowhere further down.",
    },
];

/// Line played when every floor is cleared.
pub const RUN_VICTORY_LINE: &str = "CONTAINMENT RESTORED. PANDORA.BOX SEALED.";

/// Line played when the player falls.
pub const RUN_DEFEAT_LINE: &str = "SIGNAL LOST. THE BOX CLOSES OVER YOU.";

/// Number of floors with written narrative.
pub fn scripted_floor_count() -> u32 {
    FLOORS.len() as u32
}

fn script(floor: u32) -> Option<&'static FloorScript> {
    let index = floor.checked_sub(1)?;
    FLOORS.get(index as usize)
}

/// Narrative line opening `floor`.
pub fn floor_narrative(floor: u32) -> Option<&'static str> {
    script(floor).map(|s| s.narrative)
}

/// Line shown just before the floor's encounter.
pub fn pre_combat_line(floor: u32) -> Option<&'static str> {
    script(floor).map(|s| s.pre_combat)
}

/// Line shown after winning the floor's encounter.
pub fn victory_line(floor: u32) -> Option<&'static str> {
    script(floor).map(|s| s.victory)
}

/// Line shown when leaving `floor` for the next one.
pub fn transition_line(floor: u32) -> Option<&'static str> {
    script(floor).map(|s| s.transition)
}

/// Lines of the branch picked at the protocol prompt.
pub fn branch_lines(engaged: bool) -> &'static [&'static str] {
    if engaged {
        PROTOCOL_ENGAGED_LINES
    } else {
        PROTOCOL_DENIED_LINES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn test_default_floor_count_is_scripted() {
        assert!(scripted_floor_count() >= config::MAX_FLOORS);
        for floor in 1..=config::MAX_FLOORS {
            assert!(floor_narrative(floor).is_some());
            assert!(pre_combat_line(floor).is_some());
            assert!(victory_line(floor).is_some());
            assert!(transition_line(floor).is_some());
        }
    }

    #[test]
    fn test_out_of_range_floors() {
        assert!(floor_narrative(0).is_none());
        assert!(floor_narrative(scripted_floor_count() + 1).is_none());
    }

    #[test]
    fn test_branch_lines_survive_pipe_encoding() {
        for line in PROTOCOL_ENGAGED_LINES.iter().chain(PROTOCOL_DENIED_LINES) {
            assert!(!line.contains('|'));
        }
    }
}
