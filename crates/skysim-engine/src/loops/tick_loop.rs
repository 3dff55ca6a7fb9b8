//! The periodic tick driver.
//!
//! Single writer for all flight state. Each tick runs simulation,
//! alert evaluation, and recording dispatch against a private
//! population, then publishes the result as one atomic snapshot swap.
//! A failure for one entity never aborts processing of the rest.

use std::sync::Arc;
use std::time::Duration;

use skysim_core::{FlightState, Simulator};
use tokio::sync::broadcast;
use tokio::time::interval;

use crate::recorder::RecordOutcome;
use crate::state::EngineState;

/// Run the tick loop until shutdown is signalled.
pub async fn run_tick_loop(
    state: Arc<EngineState>,
    sim: Simulator,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(Duration::from_millis(state.config().tick_interval_ms));
    let mut flights = sim.seed_flights(sim.config().flight_count);
    tracing::info!(count = flights.len(), "seeded flight population");

    // Publish the seeded population so subscribers connecting before
    // the first tick already see a full snapshot.
    state.publish_tick(flights.clone(), Vec::new());

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Tick loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                run_tick(&state, &sim, &mut flights);
            }
        }
    }
}

/// Apply exactly one tick. Split out of the loop so tests can drive
/// ticks deterministically.
pub fn run_tick(state: &Arc<EngineState>, sim: &Simulator, flights: &mut Vec<FlightState>) {
    if let Some(count) = state.take_reseed_request() {
        *flights = sim.seed_flights(count);
        state.clear_for_reseed();
        tracing::info!(count, "population reseeded");
    }

    sim.tick(flights);

    let new_alerts = state.with_monitor(|monitor| monitor.evaluate(flights, state.zones()));
    for alert in &new_alerts {
        tracing::warn!(
            flight_id = %alert.flight_id,
            kind = ?alert.kind,
            severity = ?alert.severity,
            "{}", alert.message
        );
    }

    dispatch_recordings(state, flights);

    state.publish_tick(flights.clone(), new_alerts);
}

/// Fire-and-forget recording for every opted-in flight. Outcomes are
/// logged and retained by the recorder; they never propagate back into
/// the tick.
fn dispatch_recordings(state: &Arc<EngineState>, flights: &[FlightState]) {
    for flight in flights {
        if !state.is_recording(&flight.id) {
            continue;
        }
        let recorder = state.recorder();
        let flight_id = flight.id.clone();
        let fix = flight.current_fix();
        tokio::spawn(async move {
            match recorder.record_if_changed(&flight_id, fix).await {
                RecordOutcome::Failed(reason) => {
                    tracing::warn!(flight_id = %flight_id, %reason, "position persist failed");
                }
                outcome => {
                    tracing::trace!(flight_id = %flight_id, ?outcome, "position persist");
                }
            }
        });
    }
}
