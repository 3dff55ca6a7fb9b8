//! Configuration errors raised before the engine starts ticking.

use thiserror::Error;

/// Invalid startup configuration. Fatal at initialization, never per-tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("flight count must be positive (got {0})")]
    InvalidFlightCount(i64),

    #[error("invalid geographic bounds: {0}")]
    InvalidBounds(String),

    #[error("invalid {field} range: min {min} must be below max {max}")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a probability in [0, 1] (got {value})")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("tick interval must be at least {min_ms} ms (got {got_ms})")]
    TickIntervalTooShort { min_ms: u64, got_ms: u64 },

    #[error("history capacity must be positive")]
    InvalidHistoryCapacity,
}
