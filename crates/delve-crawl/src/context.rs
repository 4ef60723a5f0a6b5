//! Per-action context shared by the sub-procedures.

use delve_mechanics::Roller;

use crate::collab::Elapsed;
use crate::config::DelveConfig;
use crate::journal::{LogEntry, LogKind};
use crate::party::Party;
use crate::state::DungeonState;

/// Mutable context handed to each sub-procedure while one action runs.
pub struct CrawlContext<'a> {
    /// The dungeon state being changed.
    pub state: &'a mut DungeonState,
    /// The party; damage and conditions are written here.
    pub party: &'a mut Party,
    /// Source of every die roll.
    pub rng: &'a mut dyn Roller,
    /// House rules.
    pub config: &'a DelveConfig,
    /// Time the action has consumed so far.
    pub elapsed: Elapsed,
    /// Entries logged by this action, oldest first.
    pub emitted: Vec<LogEntry>,
}

impl<'a> CrawlContext<'a> {
    /// Start a context for one action.
    pub fn new(
        state: &'a mut DungeonState,
        party: &'a mut Party,
        rng: &'a mut dyn Roller,
        config: &'a DelveConfig,
    ) -> Self {
        Self {
            state,
            party,
            rng,
            config,
            elapsed: Elapsed::default(),
            emitted: Vec::new(),
        }
    }

    /// Append an entry to the in-game log at the current turn.
    pub fn log(&mut self, kind: LogKind, message: impl Into<String>) {
        let entry = LogEntry {
            turn: self.state.turn,
            kind,
            message: message.into(),
        };
        log::debug!("[{kind}] {}", entry.message);
        self.state.log.push(entry.clone());
        self.emitted.push(entry);
    }

    /// Clear the encounter and let paralysis and charm wear off.
    pub fn finish_encounter(&mut self) {
        self.state.clear_encounter();
        self.party.recover_after_encounter();
    }
}
