//! Persistence layer for the long-term position log.
//!
//! The engine talks to the durable store only through [`PositionStore`],
//! a narrow interface with find-or-create append semantics. Two
//! implementations ship here: SQLite (the durable default) and an
//! in-memory store for tests and ephemeral runs.

pub mod db;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skysim_core::PositionFix;

use crate::errors::PersistenceError;

pub use db::{init_database, Database};
pub use memory::MemoryStore;
pub use sqlite::SqlitePositionStore;

/// Narrow interface required from the durable position store.
///
/// A flight's log is created lazily on first append; there is no
/// separate create operation.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Most recent entry of a flight's log, if any.
    async fn last_position(
        &self,
        flight_id: &str,
    ) -> Result<Option<PositionFix>, PersistenceError>;

    /// Append a fix and trim the log to the most recent `cap` entries.
    async fn append_position(
        &self,
        flight_id: &str,
        fix: &PositionFix,
        cap: usize,
    ) -> Result<(), PersistenceError>;

    /// Full log for a flight, oldest first.
    async fn positions(&self, flight_id: &str) -> Result<Vec<PositionFix>, PersistenceError>;

    /// Log entries with `from <= timestamp <= to`, oldest first.
    async fn positions_between(
        &self,
        flight_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PositionFix>, PersistenceError>;

    /// Bulk-delete entries older than `cutoff` across all flights.
    /// Returns the number of deleted entries.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, PersistenceError>;
}
