//! SkySim Engine - always-on simulated flight state service

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skysim_core::Simulator;
use skysim_engine::config::EngineConfig;
use skysim_engine::loops::{retention_loop, tick_loop};
use skysim_engine::persistence::{self, MemoryStore, PositionStore, SqlitePositionStore};
use skysim_engine::recorder::{Recorder, DEFAULT_LOG_CAPACITY};
use skysim_engine::state::EngineState;
use skysim_engine::zones::default_zones;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skysim_engine=info".parse()?),
        )
        .init();

    tracing::info!("Starting SkySim Engine...");

    let config = EngineConfig::from_env();
    config.validate()?;

    let store: Arc<dyn PositionStore> = match &config.database_path {
        Some(path) => {
            let db = persistence::init_database(path, config.database_max_connections).await?;
            Arc::new(SqlitePositionStore::new(db))
        }
        None => {
            tracing::warn!("SKYSIM_DB_PATH not set; position logs are in-memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let sim = Simulator::new(config.sim.clone())?;
    let recorder = Arc::new(Recorder::new(
        store.clone(),
        DEFAULT_LOG_CAPACITY,
        Duration::from_millis(config.persist_timeout_ms),
    ));
    let state = Arc::new(EngineState::new(config.clone(), default_zones(), recorder));

    let (shutdown_tx, _) = broadcast::channel(1);

    tokio::spawn(tick_loop::run_tick_loop(
        state.clone(),
        sim,
        shutdown_tx.subscribe(),
    ));
    tokio::spawn(retention_loop::run_retention_loop(
        store,
        config,
        shutdown_tx.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(());
    // Give the loops a moment to log their exit before the process ends.
    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(())
}
