//! Selective long-term position recorder.
//!
//! Records positions for opted-in flights with change detection and a
//! FIFO retention cap. Recording is fire-and-forget relative to the
//! tick loop: outcomes travel by value and are also kept in a
//! per-flight status map for asynchronous inspection.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use skysim_core::{haversine_distance, PositionFix};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::errors::PersistenceError;
use crate::persistence::PositionStore;

/// Coordinate deltas at or below this are floating-point noise, not
/// movement, and are not persisted.
pub const COORD_EPSILON: f64 = 1e-10;

/// Maximum entries kept per flight log (oldest dropped first).
pub const DEFAULT_LOG_CAPACITY: usize = 5_000;

/// Outcome of one recording attempt, propagated by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "result", content = "reason")]
pub enum RecordOutcome {
    Saved,
    Unchanged,
    Failed(String),
}

/// Aggregate statistics over a flight's persisted log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStats {
    pub count: usize,
    pub first: Option<PositionFix>,
    pub last: Option<PositionFix>,
    /// Cumulative great-circle distance over consecutive fixes, meters.
    pub distance_m: f64,
    /// Seconds between first and last fix.
    pub duration_secs: i64,
}

/// Per-step coordinate-delta statistics over a flight's persisted log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaStats {
    pub steps: usize,
    pub mean_abs_dlat: f64,
    pub mean_abs_dlng: f64,
}

pub struct Recorder {
    store: Arc<dyn PositionStore>,
    cap: usize,
    persist_timeout: Duration,
    /// Serializes read-modify-write per flight so overlapping persists
    /// for the same id cannot lose updates.
    flight_locks: DashMap<String, Arc<Mutex<()>>>,
    last_outcomes: DashMap<String, RecordOutcome>,
}

impl Recorder {
    pub fn new(store: Arc<dyn PositionStore>, cap: usize, persist_timeout: Duration) -> Self {
        Self {
            store,
            cap: cap.max(1),
            persist_timeout,
            flight_locks: DashMap::new(),
            last_outcomes: DashMap::new(),
        }
    }

    pub fn store(&self) -> Arc<dyn PositionStore> {
        self.store.clone()
    }

    /// Persist `fix` unless it is within epsilon of the last stored
    /// entry on both axes. Never returns an error: failures become
    /// [`RecordOutcome::Failed`].
    pub async fn record_if_changed(&self, flight_id: &str, fix: PositionFix) -> RecordOutcome {
        let lock = self
            .flight_locks
            .entry(flight_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let outcome = match self.try_record(flight_id, &fix).await {
            Ok(outcome) => outcome,
            Err(err) => RecordOutcome::Failed(err.to_string()),
        };
        self.last_outcomes
            .insert(flight_id.to_string(), outcome.clone());
        outcome
    }

    async fn try_record(
        &self,
        flight_id: &str,
        fix: &PositionFix,
    ) -> Result<RecordOutcome, PersistenceError> {
        let last = self
            .bounded(self.store.last_position(flight_id))
            .await??;

        if let Some(last) = last {
            let dlat = (fix.lat - last.lat).abs();
            let dlng = (fix.lng - last.lng).abs();
            if dlat <= COORD_EPSILON && dlng <= COORD_EPSILON {
                return Ok(RecordOutcome::Unchanged);
            }
        }

        self.bounded(self.store.append_position(flight_id, fix, self.cap))
            .await??;
        Ok(RecordOutcome::Saved)
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = T>,
    ) -> Result<T, PersistenceError> {
        timeout(self.persist_timeout, fut)
            .await
            .map_err(|_| PersistenceError::Timeout(self.persist_timeout))
    }

    /// Last recording outcome observed for a flight, if any.
    pub fn last_outcome(&self, flight_id: &str) -> Option<RecordOutcome> {
        self.last_outcomes.get(flight_id).map(|o| o.clone())
    }

    /// Drop all per-flight bookkeeping, e.g. after a reseed invalidated
    /// every flight id. Persisted logs are untouched.
    pub fn reset(&self) {
        self.flight_locks.clear();
        self.last_outcomes.clear();
    }

    /// Full persisted log, oldest first.
    pub async fn positions(&self, flight_id: &str) -> Result<Vec<PositionFix>, PersistenceError> {
        self.store.positions(flight_id).await
    }

    /// Persisted entries within an inclusive time range.
    pub async fn positions_between(
        &self,
        flight_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PositionFix>, PersistenceError> {
        self.store.positions_between(flight_id, from, to).await
    }

    /// Aggregate stats over the persisted log, recomputed on demand.
    pub async fn stats(&self, flight_id: &str) -> Result<TrackStats, PersistenceError> {
        let log = self.store.positions(flight_id).await?;

        let distance_m = log
            .windows(2)
            .map(|pair| haversine_distance(pair[0].lat, pair[0].lng, pair[1].lat, pair[1].lng))
            .sum();
        let duration_secs = match (log.first(), log.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_seconds(),
            _ => 0,
        };

        Ok(TrackStats {
            count: log.len(),
            first: log.first().copied(),
            last: log.last().copied(),
            distance_m,
            duration_secs,
        })
    }

    /// Per-step coordinate deltas over the persisted log.
    pub async fn delta_stats(&self, flight_id: &str) -> Result<DeltaStats, PersistenceError> {
        let log = self.store.positions(flight_id).await?;
        let steps = log.len().saturating_sub(1);
        if steps == 0 {
            return Ok(DeltaStats {
                steps: 0,
                mean_abs_dlat: 0.0,
                mean_abs_dlng: 0.0,
            });
        }

        let (sum_dlat, sum_dlng) = log.windows(2).fold((0.0, 0.0), |acc, pair| {
            (
                acc.0 + (pair[1].lat - pair[0].lat).abs(),
                acc.1 + (pair[1].lng - pair[0].lng).abs(),
            )
        });

        Ok(DeltaStats {
            steps,
            mean_abs_dlat: sum_dlat / steps as f64,
            mean_abs_dlng: sum_dlng / steps as f64,
        })
    }
}
