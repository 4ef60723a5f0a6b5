//! Turn-based dungeon crawl engine.
//!
//! A [`Delve`] owns the [`DungeonState`] of one expedition and the party
//! exploring it. Player actions go in through [`Delve::apply`]; each one runs
//! to completion against the state, appends entries to the in-game log, and
//! returns an [`ActionReport`]. Elapsed time and banked loot are handed to
//! optional [`Calendar`] and [`Ledger`] collaborators.
//!
//! Sub-procedures live in their own modules: area stocking, encounter setup,
//! combat rounds, obstacle resolution, evasion, resources and travel, and
//! treasure generation.

pub mod collab;
pub mod combat;
pub mod config;
pub mod context;
pub mod delve;
pub mod encounter;
pub mod error;
pub mod evasion;
pub mod journal;
pub mod obstacle;
pub mod party;
pub mod resources;
pub mod state;
pub mod stocking;
pub mod tables;
pub mod treasure;

pub use collab::{Calendar, Elapsed, Ledger, MemoryLedger, TurnCalendar};
pub use config::DelveConfig;
pub use delve::{Action, ActionReport, Delve, EncounterChoice};
pub use error::{CrawlError, CrawlResult};
pub use journal::{Journal, LogEntry, LogKind};
pub use obstacle::Strategy;
pub use party::{Character, CharacterClass, Condition, Party};
pub use state::{DungeonState, Lighting, Status};
