//! Dice types, formulas, and rolling.
//!
//! Supports standard polyhedral dice (d4 through d100) and custom dice.
//! All rolling goes through a [`Roller`], so the same code runs against a
//! seeded [`rand::rngs::StdRng`] in play and a [`ScriptedRoller`] in tests.

pub mod formula;
pub mod roller;

pub use formula::DiceFormula;
pub use roller::{Roller, ScriptedRoller};

use serde::{Deserialize, Serialize};

/// A polyhedral die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    /// Four-sided die.
    D4,
    /// Six-sided die.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die.
    D20,
    /// Percentile die (1-100).
    D100,
    /// A die with a custom number of sides.
    Custom(u32),
}

impl Die {
    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
            Self::Custom(n) => n,
        }
    }

    /// The die with the given number of sides, using a named variant when one exists.
    pub fn from_sides(sides: u32) -> Self {
        match sides {
            4 => Self::D4,
            6 => Self::D6,
            8 => Self::D8,
            10 => Self::D10,
            12 => Self::D12,
            20 => Self::D20,
            100 => Self::D100,
            n => Self::Custom(n),
        }
    }

    /// Roll this die once.
    pub fn roll<R: Roller + ?Sized>(self, rng: &mut R) -> u32 {
        rng.roll_die(self.sides())
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_sides() {
        assert_eq!(Die::D4.sides(), 4);
        assert_eq!(Die::D6.sides(), 6);
        assert_eq!(Die::D8.sides(), 8);
        assert_eq!(Die::D10.sides(), 10);
        assert_eq!(Die::D12.sides(), 12);
        assert_eq!(Die::D20.sides(), 20);
        assert_eq!(Die::D100.sides(), 100);
        assert_eq!(Die::Custom(3).sides(), 3);
    }

    #[test]
    fn named_dice_from_sides() {
        assert_eq!(Die::from_sides(20), Die::D20);
        assert_eq!(Die::from_sides(100), Die::D100);
        assert_eq!(Die::from_sides(3), Die::Custom(3));
    }

    #[test]
    fn die_display() {
        assert_eq!(Die::D20.to_string(), "d20");
        assert_eq!(Die::Custom(3).to_string(), "d3");
    }

    #[test]
    fn die_rolls_scripted_value() {
        let mut rng = ScriptedRoller::new([4]);
        assert_eq!(Die::D6.roll(&mut rng), 4);
    }
}
