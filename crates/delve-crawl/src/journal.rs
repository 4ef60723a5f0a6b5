//! The in-game log: a bounded, newest-first record of what happened.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of entries kept; older entries fall off the end.
pub const LOG_CAPACITY: usize = 200;

/// Broad category of a log entry, for filtering and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Movement and area descriptions.
    Explore,
    /// Monsters appearing, reactions, parley, and evasion.
    Encounter,
    /// Attacks, damage, morale.
    Combat,
    /// Doors, traps, hazards, and features.
    Obstacle,
    /// Treasure found or banked.
    Treasure,
    /// Time, light, food, and travel.
    Travel,
    /// An action that could not be taken in the current state.
    Rejected,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explore => write!(f, "explore"),
            Self::Encounter => write!(f, "encounter"),
            Self::Combat => write!(f, "combat"),
            Self::Obstacle => write!(f, "obstacle"),
            Self::Treasure => write!(f, "treasure"),
            Self::Travel => write!(f, "travel"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A single line in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Dungeon turn when the entry was written.
    pub turn: u32,
    /// Entry category.
    pub kind: LogKind,
    /// Human-readable text.
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[turn {}] {}", self.turn, self.message)
    }
}

/// Newest-first log bounded to [`LOG_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal {
    entries: VecDeque<LogEntry>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry as the newest, dropping the oldest past capacity.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Drop the oldest entries beyond capacity.
    pub fn enforce_capacity(&mut self) {
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    /// Export the journal as plain text, oldest first.
    pub fn export_text(&self) -> String {
        let mut out = String::from("Delve Log\n=========\n\n");
        for entry in self.entries.iter().rev() {
            out.push_str(&format!("{entry}\n"));
        }
        out
    }
}
