//! Injectable die sources.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of die rolls.
///
/// Every random decision in the engine goes through this trait. Only
/// [`Roller::roll_die`] must be provided; the helpers build on it so a
/// scripted source sees exactly one value per physical die.
pub trait Roller {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll `count` dice of `sides` faces and sum them.
    fn roll_sum(&mut self, count: u32, sides: u32) -> u32 {
        let mut total = 0;
        for _ in 0..count {
            total += self.roll_die(sides);
        }
        total
    }

    /// True when one die of `sides` faces comes up `chance` or lower ("2-in-6").
    fn chance_in(&mut self, chance: u32, sides: u32) -> bool {
        self.roll_die(sides) <= chance
    }

    /// True when a d100 roll comes up at or under `percent`.
    fn percent(&mut self, percent: u32) -> bool {
        self.roll_die(100) <= percent
    }

    /// Pick a uniformly random index below `len`. Returns 0 for empty ranges.
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.roll_die(len as u32) as usize - 1
    }
}

impl Roller for StdRng {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return 1;
        }
        self.random_range(1..=sides)
    }
}

/// A roller that replays a fixed sequence of die faces.
///
/// Each scripted value is clamped into the requested die's range. Once the
/// script runs out, rolls come from a fixed-seed [`StdRng`], so long
/// scenarios stay deterministic without scripting every die.
#[derive(Debug, Clone)]
pub struct ScriptedRoller {
    script: VecDeque<u32>,
    fallback: StdRng,
}

impl ScriptedRoller {
    /// Create a roller that yields `values` in order.
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: values.into_iter().collect(),
            fallback: StdRng::seed_from_u64(0),
        }
    }

    /// Number of scripted values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Roller for ScriptedRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        match self.script.pop_front() {
            Some(value) => value.clamp(1, sides.max(1)),
            None => self.fallback.roll_die(sides),
        }
    }
}
