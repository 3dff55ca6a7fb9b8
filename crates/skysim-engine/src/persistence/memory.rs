//! In-memory position store for tests and ephemeral runs.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use skysim_core::PositionFix;

use crate::errors::PersistenceError;
use crate::persistence::PositionStore;

/// Position log kept entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    logs: DashMap<String, Vec<PositionFix>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, to exercise recoverable-error paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn log_count(&self) -> usize {
        self.logs.len()
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn last_position(
        &self,
        flight_id: &str,
    ) -> Result<Option<PositionFix>, PersistenceError> {
        Ok(self
            .logs
            .get(flight_id)
            .and_then(|log| log.last().copied()))
    }

    async fn append_position(
        &self,
        flight_id: &str,
        fix: &PositionFix,
        cap: usize,
    ) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "memory store configured to fail".to_string(),
            ));
        }
        let mut log = self.logs.entry(flight_id.to_string()).or_default();
        log.push(*fix);
        if log.len() > cap {
            let excess = log.len() - cap;
            log.drain(..excess);
        }
        Ok(())
    }

    async fn positions(&self, flight_id: &str) -> Result<Vec<PositionFix>, PersistenceError> {
        Ok(self
            .logs
            .get(flight_id)
            .map(|log| log.clone())
            .unwrap_or_default())
    }

    async fn positions_between(
        &self,
        flight_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PositionFix>, PersistenceError> {
        Ok(self
            .logs
            .get(flight_id)
            .map(|log| {
                log.iter()
                    .filter(|fix| fix.timestamp >= from && fix.timestamp <= to)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, PersistenceError> {
        let mut deleted = 0u64;
        for mut entry in self.logs.iter_mut() {
            let before = entry.len();
            entry.retain(|fix| fix.timestamp >= cutoff);
            deleted += (before - entry.len()) as u64;
        }
        self.logs.retain(|_, log| !log.is_empty());
        Ok(deleted)
    }
}
