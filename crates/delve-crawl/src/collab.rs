//! Calendar and Ledger collaborators.
//!
//! The engine does not keep the campaign clock or the treasury. After every
//! action it reports elapsed time to a [`Calendar`], and after a successful
//! return to the surface it deposits the haul with a [`Ledger`].

use std::cell::RefCell;
use std::rc::Rc;

/// Game time consumed by one action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Elapsed {
    /// Ten-minute dungeon turns.
    pub turns: u32,
    /// Ten-second combat rounds.
    pub rounds: u32,
}

impl Elapsed {
    /// True if no time passed.
    pub fn is_zero(&self) -> bool {
        self.turns == 0 && self.rounds == 0
    }
}

/// Receives elapsed game time.
pub trait Calendar {
    /// Advance the clock by the time an action took.
    fn advance(&mut self, elapsed: Elapsed);
}

/// Receives banked treasure.
pub trait Ledger {
    /// Record a deposit of `gold` gold pieces.
    fn deposit(&mut self, gold: f64, description: &str);
}

/// A calendar that only totals turns and rounds.
///
/// Clones share the same totals, so a caller can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct TurnCalendar {
    totals: Rc<RefCell<Elapsed>>,
}

impl TurnCalendar {
    /// Create a calendar at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time reported so far.
    pub fn total(&self) -> Elapsed {
        *self.totals.borrow()
    }
}

impl Calendar for TurnCalendar {
    fn advance(&mut self, elapsed: Elapsed) {
        let mut totals = self.totals.borrow_mut();
        totals.turns += elapsed.turns;
        totals.rounds += elapsed.rounds;
    }
}

/// A ledger that keeps deposits in memory. Clones share the same deposits.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    deposits: Rc<RefCell<Vec<(f64, String)>>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All deposits in order.
    pub fn deposits(&self) -> Vec<(f64, String)> {
        self.deposits.borrow().clone()
    }

    /// Sum of all deposits.
    pub fn balance(&self) -> f64 {
        self.deposits.borrow().iter().map(|(gold, _)| gold).sum()
    }
}

impl Ledger for MemoryLedger {
    fn deposit(&mut self, gold: f64, description: &str) {
        self.deposits
            .borrow_mut()
            .push((gold, description.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_clones_share_totals() {
        let handle = TurnCalendar::new();
        let mut owned = handle.clone();
        owned.advance(Elapsed {
            turns: 2,
            rounds: 0,
        });
        owned.advance(Elapsed {
            turns: 0,
            rounds: 3,
        });
        assert_eq!(
            handle.total(),
            Elapsed {
                turns: 2,
                rounds: 3
            }
        );
    }

    #[test]
    fn ledger_records_deposits() {
        let handle = MemoryLedger::new();
        let mut owned = handle.clone();
        owned.deposit(120.5, "Delve loot from depth 1");
        owned.deposit(30.0, "Delve loot from depth 2");
        assert_eq!(handle.deposits().len(), 2);
        assert!((handle.balance() - 150.5).abs() < f64::EPSILON);
    }

    #[test]
    fn elapsed_zero() {
        assert!(Elapsed::default().is_zero());
        assert!(
            !Elapsed {
                turns: 0,
                rounds: 1
            }
            .is_zero()
        );
    }
}
