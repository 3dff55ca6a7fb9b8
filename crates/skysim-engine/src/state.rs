//! Shared engine state and the control surface consumed from outside.
//!
//! The tick loop is the single writer: it applies a whole tick to its
//! private population and then swaps the readable snapshot in one
//! atomic store, so concurrent readers observe either the pre-tick or
//! the fully post-tick state, never anything in between.

use std::sync::{Arc, Mutex, RwLock};

use dashmap::DashMap;
use skysim_core::{Alert, AlertMonitor, FlightState, RestrictedZone};
use tokio::sync::broadcast;

use crate::broadcast::{Broadcaster, TickUpdate};
use crate::config::EngineConfig;
use crate::errors::ValidationError;
use crate::recorder::Recorder;

/// Consistent view of the population as of the end of a tick.
#[derive(Debug, Default)]
pub struct TickSnapshot {
    pub flights: Vec<FlightState>,
    /// Number of ticks applied since startup or the last reseed.
    pub tick: u64,
}

pub struct EngineState {
    config: EngineConfig,
    zones: Vec<RestrictedZone>,
    snapshot: RwLock<Arc<TickSnapshot>>,
    monitor: Mutex<AlertMonitor>,
    /// Flights currently opted into long-term recording.
    recording: DashMap<String, ()>,
    reseed_request: Mutex<Option<usize>>,
    recorder: Arc<Recorder>,
    broadcaster: Broadcaster,
}

impl EngineState {
    pub fn new(config: EngineConfig, zones: Vec<RestrictedZone>, recorder: Arc<Recorder>) -> Self {
        let broadcaster = Broadcaster::new(config.broadcast_capacity);
        Self {
            config,
            zones,
            snapshot: RwLock::new(Arc::new(TickSnapshot::default())),
            monitor: Mutex::new(AlertMonitor::new()),
            recording: DashMap::new(),
            reseed_request: Mutex::new(None),
            recorder,
            broadcaster,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn zones(&self) -> &[RestrictedZone] {
        &self.zones
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        self.recorder.clone()
    }

    /// Current readable snapshot.
    pub fn snapshot(&self) -> Arc<TickSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Swap in the post-tick snapshot and fan it out to subscribers.
    /// Called by the tick loop only.
    pub fn publish_tick(&self, flights: Vec<FlightState>, new_alerts: Vec<Alert>) {
        let tick = {
            let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
            let tick = guard.tick + 1;
            *guard = Arc::new(TickSnapshot {
                flights: flights.clone(),
                tick,
            });
            tick
        };
        tracing::trace!(tick, flights = flights.len(), alerts = new_alerts.len(), "tick published");
        self.broadcaster.send(Arc::new(TickUpdate {
            flights,
            alerts: new_alerts,
        }));
    }

    /// Run the alert monitor under its lock.
    pub fn with_monitor<T>(&self, f: impl FnOnce(&mut AlertMonitor) -> T) -> T {
        let mut monitor = self.monitor.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut monitor)
    }

    /// All currently live alerts.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.with_monitor(|monitor| monitor.active_alerts())
    }

    /// Subscribe to post-tick updates. The current snapshot is
    /// returned alongside the receiver so a new subscriber has no
    /// cold-start gap; a duplicate of the latest tick may follow.
    pub fn subscribe(&self) -> (Arc<TickSnapshot>, broadcast::Receiver<Arc<TickUpdate>>) {
        let rx = self.broadcaster.subscribe();
        (self.snapshot(), rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    // ========== CONTROL SURFACE ==========

    /// Number of flights in the current snapshot.
    pub fn flight_count(&self) -> usize {
        self.snapshot().flights.len()
    }

    /// Opt a flight into long-term recording.
    pub fn start_recording(&self, flight_id: &str) -> Result<(), ValidationError> {
        if !self.flight_exists(flight_id) {
            return Err(ValidationError::UnknownFlight(flight_id.to_string()));
        }
        self.recording.insert(flight_id.to_string(), ());
        tracing::info!(flight_id, "recording started");
        Ok(())
    }

    /// Opt a flight out of long-term recording.
    pub fn stop_recording(&self, flight_id: &str) -> Result<(), ValidationError> {
        if !self.flight_exists(flight_id) {
            return Err(ValidationError::UnknownFlight(flight_id.to_string()));
        }
        if self.recording.remove(flight_id).is_none() {
            return Err(ValidationError::NotRecording(flight_id.to_string()));
        }
        tracing::info!(flight_id, "recording stopped");
        Ok(())
    }

    pub fn is_recording(&self, flight_id: &str) -> bool {
        self.recording.contains_key(flight_id)
    }

    pub fn recording_ids(&self) -> Vec<String> {
        self.recording.iter().map(|e| e.key().clone()).collect()
    }

    /// Dismiss a live alert by id.
    pub fn dismiss_alert(&self, alert_id: &str) -> Result<(), ValidationError> {
        if self.with_monitor(|monitor| monitor.dismiss(alert_id)) {
            Ok(())
        } else {
            Err(ValidationError::UnknownAlert(alert_id.to_string()))
        }
    }

    /// Request a population reseed, applied atomically at the next tick
    /// boundary.
    pub fn request_reseed(&self, count: usize) -> Result<(), ValidationError> {
        if count == 0 {
            return Err(ValidationError::InvalidReseedCount);
        }
        if count > self.config.max_flight_count {
            return Err(ValidationError::ReseedCountTooLarge {
                got: count,
                max: self.config.max_flight_count,
            });
        }
        let mut pending = self.reseed_request.lock().unwrap_or_else(|e| e.into_inner());
        *pending = Some(count);
        Ok(())
    }

    /// Take the pending reseed request, if any. Tick loop only.
    pub fn take_reseed_request(&self) -> Option<usize> {
        self.reseed_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    /// Clear alert and recording state after a reseed invalidated all
    /// flight ids.
    pub fn clear_for_reseed(&self) {
        self.with_monitor(|monitor| monitor.reset());
        self.recording.clear();
        self.recorder.reset();
    }

    fn flight_exists(&self, flight_id: &str) -> bool {
        self.snapshot()
            .flights
            .iter()
            .any(|flight| flight.id == flight_id)
    }
}
