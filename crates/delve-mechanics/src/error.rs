//! Error types for the dice mechanics.

/// Errors that can occur while building or evaluating dice.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A dice formula could not be parsed.
    #[error("invalid dice formula '{formula}': {reason}")]
    InvalidFormula {
        /// The formula text as given.
        formula: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
