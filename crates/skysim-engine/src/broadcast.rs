//! Broadcast fan-out of post-tick updates.

use std::sync::Arc;

use serde::Serialize;
use skysim_core::{Alert, FlightState};
use tokio::sync::broadcast;

/// What every subscriber receives after a tick: the full flight
/// snapshot plus the alerts created by that tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickUpdate {
    pub flights: Vec<FlightState>,
    pub alerts: Vec<Alert>,
}

/// Fan-out channel to all active subscribers.
///
/// Slow subscribers that lag past the channel capacity drop missed
/// updates and resume at the next snapshot; no per-subscriber
/// filtering happens here.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Arc<TickUpdate>>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<TickUpdate>> {
        self.tx.subscribe()
    }

    pub fn send(&self, update: Arc<TickUpdate>) {
        // Err means no subscribers are connected right now; that's fine.
        let _ = self.tx.send(update);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
