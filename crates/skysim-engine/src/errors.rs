//! Engine error taxonomy.
//!
//! Persistence failures are recoverable and travel by value back to the
//! caller; they are never re-thrown into the tick loop. Control-surface
//! validation failures are reported synchronously and mutate nothing.

use std::time::Duration;

use thiserror::Error;

/// Durable-store failure. Recoverable: the engine keeps simulating and
/// the unchanged-check means recording is delayed, not lost.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("position store unavailable: {0}")]
    Unavailable(String),

    #[error("position store call timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Rejected control-surface request. No engine state was mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown flight id: {0}")]
    UnknownFlight(String),

    #[error("unknown alert id: {0}")]
    UnknownAlert(String),

    #[error("flight {0} is not being recorded")]
    NotRecording(String),

    #[error("reseed count must be positive")]
    InvalidReseedCount,

    #[error("reseed count {got} exceeds limit {max}")]
    ReseedCountTooLarge { got: usize, max: usize },
}
