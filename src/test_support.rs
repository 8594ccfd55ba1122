//! Deterministic random sources shared by unit tests.

use crate::generation::Dice;
use std::collections::VecDeque;
use std::ops::Range;

/// Every roll lands on the top of its range.
pub struct MaxDice;

impl Dice for MaxDice {
    fn roll(&mut self, range: Range<i32>) -> i32 {
        range.end - 1
    }

    fn unit(&mut self) -> f64 {
        0.999_999
    }
}

/// Every roll lands on the bottom of its range.
pub struct MinDice;

impl Dice for MinDice {
    fn roll(&mut self, range: Range<i32>) -> i32 {
        range.start
    }

    fn unit(&mut self) -> f64 {
        0.0
    }
}

/// Replays queued values, falling back to the bottom of the range.
///
/// Integer values are clamped into the requested range.
pub struct SequenceDice {
    rolls: VecDeque<i32>,
    units: VecDeque<f64>,
}

impl SequenceDice {
    pub fn new(rolls: Vec<i32>, units: Vec<f64>) -> Self {
        Self {
            rolls: rolls.into(),
            units: units.into(),
        }
    }
}

impl Dice for SequenceDice {
    fn roll(&mut self, range: Range<i32>) -> i32 {
        match self.rolls.pop_front() {
            Some(value) => value.clamp(range.start, range.end - 1),
            None => range.start,
        }
    }

    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.0)
    }
}
