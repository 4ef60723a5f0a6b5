//! Dice mechanics for the Delve dungeon crawl engine.
//!
//! Provides polyhedral dice, compact dice formulas such as
//! `"2d6+1"` or `"1d6x1000"`, and the [`Roller`] trait through which every
//! random decision in the engine is made. Injecting a seeded or scripted
//! roller makes a whole delve reproducible.

pub mod dice;
pub mod error;

pub use dice::{DiceFormula, Die, Roller, ScriptedRoller};
pub use error::{MechError, MechResult};
