//! Engine configuration from environment.

use std::env;

use skysim_core::{ConfigError, SimConfig};

const MIN_TICK_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Upper bound accepted by the reseed control surface.
    pub max_flight_count: usize,
    /// SQLite file for the long-term position log. `None` keeps the
    /// log in memory (useful for development and tests).
    pub database_path: Option<String>,
    pub database_max_connections: u32,
    /// Bounded timeout applied to each durable-store call.
    pub persist_timeout_ms: u64,
    /// Position-log entries older than this are swept out.
    pub retention_days: i64,
    /// How often the retention sweep runs.
    pub retention_sweep_secs: u64,
    /// Capacity of the broadcast channel to subscribers.
    pub broadcast_capacity: usize,
    pub sim: SimConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 4_000,
            max_flight_count: 200,
            database_path: None,
            database_max_connections: 4,
            persist_timeout_ms: 2_000,
            retention_days: 7,
            retention_sweep_secs: 3_600,
            broadcast_capacity: 64,
            sim: SimConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = parse_env("SKYSIM_TICK_MS") {
            config.tick_interval_ms = ms;
        }
        if let Some(count) = parse_env("SKYSIM_FLIGHTS") {
            config.sim.flight_count = count;
        }
        if let Some(max) = parse_env("SKYSIM_MAX_FLIGHTS") {
            config.max_flight_count = max;
        }
        config.database_path = env::var("SKYSIM_DB_PATH").ok().filter(|p| !p.is_empty());
        if let Some(n) = parse_env("SKYSIM_DB_MAX_CONNECTIONS") {
            config.database_max_connections = n;
        }
        if let Some(ms) = parse_env("SKYSIM_PERSIST_TIMEOUT_MS") {
            config.persist_timeout_ms = ms;
        }
        if let Some(days) = parse_env("SKYSIM_RETENTION_DAYS") {
            config.retention_days = days;
        }
        if let Some(secs) = parse_env("SKYSIM_RETENTION_SWEEP_SECS") {
            config.retention_sweep_secs = secs;
        }
        config
    }

    /// Validate the whole configuration. Fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(ConfigError::TickIntervalTooShort {
                min_ms: MIN_TICK_INTERVAL_MS,
                got_ms: self.tick_interval_ms,
            });
        }
        if self.max_flight_count == 0 || self.sim.flight_count > self.max_flight_count {
            return Err(ConfigError::InvalidFlightCount(self.sim.flight_count as i64));
        }
        self.sim.validate()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn short_tick_interval_is_rejected() {
        let config = EngineConfig {
            tick_interval_ms: 10,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TickIntervalTooShort { .. })
        ));
    }

    #[test]
    fn flight_count_above_limit_is_rejected() {
        let mut config = EngineConfig::default();
        config.sim.flight_count = config.max_flight_count + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFlightCount(_))
        ));
    }
}
