//! Compact dice formulas: `"2d6+1"`, `"1d4x10"`, `"d8"`, `"3"`.
//!
//! The grammar is `[count]d<sides>[(+|-)<modifier>][(x|*)<multiplier>]` or a
//! bare integer constant. The modifier applies before the multiplier, so
//! `"1d6+1x10"` rolls 1d6, adds one, and multiplies by ten.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Die, Roller};
use crate::error::{MechError, MechResult};

/// A parsed dice formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceFormula {
    /// Number of dice rolled (0 for a constant).
    pub count: u32,
    /// Faces per die (0 for a constant).
    pub sides: u32,
    /// Flat amount added to the dice total.
    pub modifier: i32,
    /// Factor applied after the modifier.
    pub multiplier: u32,
}

impl DiceFormula {
    /// `count` dice of `sides` faces with no modifier.
    pub fn dice(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            modifier: 0,
            multiplier: 1,
        }
    }

    /// A fixed value that consumes no rolls.
    pub fn constant(value: i32) -> Self {
        Self {
            count: 0,
            sides: 0,
            modifier: value,
            multiplier: 1,
        }
    }

    /// Parse a formula string.
    pub fn parse(formula: &str) -> MechResult<Self> {
        let invalid = |reason: &str| MechError::InvalidFormula {
            formula: formula.to_string(),
            reason: reason.to_string(),
        };

        let text: String = formula
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if text.is_empty() {
            return Err(invalid("empty formula"));
        }

        let (body, multiplier) = match text.split_once(['x', '*']) {
            Some((body, mult)) => {
                let mult = mult
                    .parse::<u32>()
                    .map_err(|_| invalid("multiplier must be a positive integer"))?;
                if mult == 0 {
                    return Err(invalid("multiplier must be a positive integer"));
                }
                (body, mult)
            }
            None => (text.as_str(), 1),
        };

        let Some((count_text, rest)) = body.split_once('d') else {
            let value = body
                .parse::<i32>()
                .map_err(|_| invalid("expected NdS or an integer"))?;
            return Ok(Self {
                multiplier,
                ..Self::constant(value)
            });
        };

        let count = if count_text.is_empty() {
            1
        } else {
            count_text
                .parse::<u32>()
                .map_err(|_| invalid("dice count must be a positive integer"))?
        };
        if count == 0 {
            return Err(invalid("dice count must be a positive integer"));
        }

        let (sides_text, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let (sides, signed) = rest.split_at(pos);
                let modifier = signed
                    .parse::<i32>()
                    .map_err(|_| invalid("modifier must be an integer"))?;
                (sides, modifier)
            }
            None => (rest, 0),
        };

        let sides = sides_text
            .parse::<u32>()
            .map_err(|_| invalid("die size must be a positive integer"))?;
        if sides < 2 {
            return Err(invalid("die size must be at least 2"));
        }

        Ok(Self {
            count,
            sides,
            modifier,
            multiplier,
        })
    }

    /// Returns true if rolling this formula consumes no dice.
    pub fn is_constant(&self) -> bool {
        self.count == 0 || self.sides == 0
    }

    /// The die this formula rolls, or `None` for a constant.
    pub fn die(&self) -> Option<Die> {
        (!self.is_constant()).then(|| Die::from_sides(self.sides))
    }

    /// Roll the formula and return the final value.
    pub fn roll<R: Roller + ?Sized>(&self, rng: &mut R) -> i32 {
        let dice: u32 = match self.die() {
            Some(die) => (0..self.count).map(|_| die.roll(rng)).sum(),
            None => 0,
        };
        (dice as i32 + self.modifier) * self.multiplier as i32
    }

    /// Smallest possible result.
    pub fn min(&self) -> i32 {
        let dice = if self.is_constant() { 0 } else { self.count as i32 };
        (dice + self.modifier) * self.multiplier as i32
    }

    /// Largest possible result.
    pub fn max(&self) -> i32 {
        let dice = if self.is_constant() {
            0
        } else {
            (self.count * self.sides) as i32
        };
        (dice + self.modifier) * self.multiplier as i32
    }

    /// Expected value of the formula.
    pub fn average(&self) -> f64 {
        let dice = if self.is_constant() {
            0.0
        } else {
            f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0
        };
        (dice + f64::from(self.modifier)) * f64::from(self.multiplier)
    }
}

impl FromStr for DiceFormula {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_constant() {
            write!(f, "{}", self.modifier)?;
        } else {
            write!(f, "{}d{}", self.count, self.sides)?;
            match self.modifier {
                0 => {}
                m if m > 0 => write!(f, "+{m}")?,
                m => write!(f, "{m}")?,
            }
        }
        if self.multiplier != 1 {
            write!(f, "x{}", self.multiplier)?;
        }
        Ok(())
    }
}

/// Parse and roll a formula in one step.
pub fn evaluate<R: Roller + ?Sized>(formula: &str, rng: &mut R) -> MechResult<i32> {
    Ok(DiceFormula::parse(formula)?.roll(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRoller;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parse_simple_dice() {
        let f = DiceFormula::parse("2d6").unwrap();
        assert_eq!(f, DiceFormula::dice(2, 6));
    }

    #[test]
    fn parse_implicit_count() {
        let f = DiceFormula::parse("d8").unwrap();
        assert_eq!(f, DiceFormula::dice(1, 8));
    }

    #[test]
    fn parse_modifiers() {
        assert_eq!(DiceFormula::parse("2d6+1").unwrap().modifier, 1);
        assert_eq!(DiceFormula::parse("1d4-1").unwrap().modifier, -1);
        assert_eq!(DiceFormula::parse(" 3d8 + 2 ").unwrap().modifier, 2);
    }

    #[test]
    fn parse_multiplier() {
        let f = DiceFormula::parse("1d6x1000").unwrap();
        assert_eq!(f.multiplier, 1000);
        let f = DiceFormula::parse("2d6*10").unwrap();
        assert_eq!(f.multiplier, 10);
    }

    #[test]
    fn parse_constant() {
        let f = DiceFormula::parse("3").unwrap();
        assert!(f.is_constant());
        assert_eq!(f.min(), 3);
        assert_eq!(f.max(), 3);
    }

    #[test]
    fn parse_errors() {
        for bad in ["", "d", "0d6", "2d1", "2d", "xd6", "2d6+", "1d6x0", "abc"] {
            assert!(DiceFormula::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn error_message_names_formula() {
        let err = DiceFormula::parse("2q6").unwrap_err();
        assert!(err.to_string().contains("2q6"));
    }

    #[test]
    fn roll_applies_modifier_then_multiplier() {
        let mut rng = ScriptedRoller::new([3, 4]);
        assert_eq!(DiceFormula::parse("2d6+1").unwrap().roll(&mut rng), 8);
        let mut rng = ScriptedRoller::new([2]);
        assert_eq!(DiceFormula::parse("1d4+1x10").unwrap().roll(&mut rng), 30);
    }

    #[test]
    fn constant_consumes_no_rolls() {
        let mut rng = ScriptedRoller::new([6]);
        assert_eq!(DiceFormula::constant(1).roll(&mut rng), 1);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn bounds_and_average() {
        let f = DiceFormula::parse("2d6+1").unwrap();
        assert_eq!(f.min(), 3);
        assert_eq!(f.max(), 13);
        assert!((f.average() - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_round_trips() {
        for text in ["2d6", "2d6+1", "1d4-1", "1d6x1000", "5", "3d6+2x10"] {
            let f = DiceFormula::parse(text).unwrap();
            assert_eq!(f.to_string(), text);
        }
    }

    #[test]
    fn die_matches_formula() {
        assert_eq!(DiceFormula::parse("3d8+2").unwrap().die(), Some(Die::D8));
        assert_eq!(DiceFormula::parse("1d3").unwrap().die(), Some(Die::Custom(3)));
        assert_eq!(DiceFormula::constant(4).die(), None);
    }

    #[test]
    fn evaluate_in_one_step() {
        let mut rng = ScriptedRoller::new([5]);
        assert_eq!(evaluate("1d6+1", &mut rng).unwrap(), 6);
        assert!(evaluate("nonsense", &mut rng).is_err());
    }

    proptest! {
        #[test]
        fn rolls_stay_within_bounds(
            count in 1u32..6,
            sides in 2u32..20,
            modifier in -3i32..4,
            seed in any::<u64>(),
        ) {
            let f = DiceFormula { count, sides, modifier, multiplier: 1 };
            let mut rng = StdRng::seed_from_u64(seed);
            let v = f.roll(&mut rng);
            prop_assert!(v >= f.min() && v <= f.max());
        }
    }
}
