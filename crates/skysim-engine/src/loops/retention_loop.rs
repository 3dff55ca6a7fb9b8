//! Position-log retention sweep.
//!
//! Periodically bulk-deletes persisted entries older than the
//! configured window so the durable store doesn't grow without bound.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::broadcast;
use tokio::time::interval;

use crate::backoff::Backoff;
use crate::config::EngineConfig;
use crate::persistence::PositionStore;

const RETENTION_BACKOFF_MAX_SECS: u64 = 600;

pub async fn run_retention_loop(
    store: Arc<dyn PositionStore>,
    config: EngineConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(Duration::from_secs(config.retention_sweep_secs.max(1)));
    let mut backoff = Backoff::new(
        Duration::from_secs(config.retention_sweep_secs.max(1)),
        Duration::from_secs(RETENTION_BACKOFF_MAX_SECS),
    );

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Retention loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                if !backoff.ready() {
                    continue;
                }
                let cutoff = Utc::now() - ChronoDuration::days(config.retention_days);
                match store.delete_older_than(cutoff).await {
                    Ok(0) => {
                        backoff.reset();
                    }
                    Ok(deleted) => {
                        tracing::info!(deleted, %cutoff, "swept expired position-log entries");
                        backoff.reset();
                    }
                    Err(err) => {
                        let delay = backoff.fail();
                        tracing::warn!("Retention sweep failed: {} (backing off {:?})", err, delay);
                    }
                }
            }
        }
    }
}
