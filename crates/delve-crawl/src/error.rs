//! Error types for the crawl engine.
//!
//! Gameplay failures (a dead character, a failed escape) are state
//! transitions, not errors. The only error class is a snapshot that cannot
//! be imported.

use thiserror::Error;

/// Result type for crawl operations.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Errors that can occur when moving dungeon state in or out of the engine.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The snapshot is not valid JSON or is missing or mistyping a field.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// The snapshot parsed but violates a state invariant.
    #[error("inconsistent snapshot: {0}")]
    InconsistentSnapshot(String),

    /// The state could not be serialized.
    #[error("failed to export snapshot: {0}")]
    Export(String),
}
