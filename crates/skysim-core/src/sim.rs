//! Tick-driven flight simulator.
//!
//! Motion is a bounded stochastic walk, not aerodynamics: each tick
//! perturbs position, altitude, speed and heading within configured
//! limits, then re-clamps every value into its legal domain so no
//! entity can ever reach an invalid numeric state.

use chrono::Utc;
use rand::Rng;

use crate::error::ConfigError;
use crate::models::{FlightState, FlightStatus, DEFAULT_HISTORY_CAPACITY};
use crate::spatial::{wrap_heading, GeoBounds};

/// Airline prefixes used when generating flight numbers.
const CARRIER_CODES: [&str; 5] = ["AI", "6E", "SG", "UK", "QP"];

/// Configuration for the simulated population.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Number of flights seeded at startup.
    pub flight_count: usize,
    /// Region flights are seeded into.
    pub bounds: GeoBounds,
    /// Maximum per-tick position perturbation in degrees.
    pub position_jitter_deg: f64,
    pub min_altitude_ft: f64,
    pub max_altitude_ft: f64,
    pub altitude_jitter_ft: f64,
    pub min_speed_kt: f64,
    pub max_speed_kt: f64,
    pub speed_jitter_kt: f64,
    pub heading_jitter_deg: f64,
    pub history_capacity: usize,
    /// Per-tick probability of losing communication.
    pub lost_comm_probability: f64,
    /// Per-tick probability of becoming delayed.
    pub delayed_probability: f64,
    /// Per-tick probability of landing.
    pub landed_probability: f64,
    /// Per-tick probability that a delayed or lost-comm flight returns
    /// to normal operation.
    pub recovery_probability: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            flight_count: 12,
            // Indian subcontinent, matching the default restricted zones.
            bounds: GeoBounds {
                min_lat: 8.0,
                max_lat: 32.0,
                min_lng: 68.0,
                max_lng: 92.0,
            },
            position_jitter_deg: 0.08,
            min_altitude_ft: 4_000.0,
            max_altitude_ft: 42_000.0,
            altitude_jitter_ft: 800.0,
            min_speed_kt: 180.0,
            max_speed_kt: 560.0,
            speed_jitter_kt: 20.0,
            heading_jitter_deg: 8.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            lost_comm_probability: 0.01,
            delayed_probability: 0.01,
            landed_probability: 0.005,
            recovery_probability: 0.05,
        }
    }
}

impl SimConfig {
    /// Validate the configuration. Called once at startup; the tick
    /// loop assumes a valid config and never re-checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flight_count == 0 {
            return Err(ConfigError::InvalidFlightCount(self.flight_count as i64));
        }
        if !self.bounds.is_valid() {
            return Err(ConfigError::InvalidBounds(format!(
                "lat {}..{} lng {}..{}",
                self.bounds.min_lat, self.bounds.max_lat, self.bounds.min_lng, self.bounds.max_lng
            )));
        }
        if self.min_altitude_ft >= self.max_altitude_ft {
            return Err(ConfigError::InvalidRange {
                field: "altitude",
                min: self.min_altitude_ft,
                max: self.max_altitude_ft,
            });
        }
        if self.min_speed_kt >= self.max_speed_kt {
            return Err(ConfigError::InvalidRange {
                field: "speed",
                min: self.min_speed_kt,
                max: self.max_speed_kt,
            });
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::InvalidHistoryCapacity);
        }
        for (field, value) in [
            ("lost_comm_probability", self.lost_comm_probability),
            ("delayed_probability", self.delayed_probability),
            ("landed_probability", self.landed_probability),
            ("recovery_probability", self.recovery_probability),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::InvalidProbability { field, value });
            }
        }
        Ok(())
    }
}

/// Advances the simulated population one step at a time.
///
/// The simulator is the only writer of flight state. Landed flights
/// stay in the population but are frozen: neither their motion nor
/// their status is updated again.
pub struct Simulator {
    config: SimConfig,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Seed `count` flights at random positions within the configured
    /// bounds, all on-time.
    pub fn seed_flights(&self, count: usize) -> Vec<FlightState> {
        let mut rng = rand::rng();
        let cfg = &self.config;
        let now = Utc::now();

        (0..count)
            .map(|i| {
                let (lat, lng) = cfg.bounds.random_point(&mut rng);
                let carrier = CARRIER_CODES[rng.random_range(0..CARRIER_CODES.len())];
                let mut flight = FlightState {
                    id: uuid::Uuid::new_v4().to_string(),
                    flight_number: format!("{}{}", carrier, 100 + i),
                    lat,
                    lng,
                    altitude: rng.random_range(cfg.min_altitude_ft..cfg.max_altitude_ft),
                    speed: rng.random_range(cfg.min_speed_kt..cfg.max_speed_kt),
                    heading: rng.random_range(0.0..360.0),
                    status: FlightStatus::OnTime,
                    history: std::collections::VecDeque::with_capacity(cfg.history_capacity),
                    updated_at: now,
                };
                let fix = flight.current_fix();
                flight.push_fix(fix, cfg.history_capacity);
                flight
            })
            .collect()
    }

    /// Advance every flight one tick.
    pub fn tick(&self, flights: &mut [FlightState]) {
        let mut rng = rand::rng();
        for flight in flights.iter_mut() {
            self.advance_flight(&mut rng, flight);
        }
    }

    fn advance_flight(&self, rng: &mut impl Rng, flight: &mut FlightState) {
        if flight.status == FlightStatus::Landed {
            return;
        }

        let cfg = &self.config;
        let pj = cfg.position_jitter_deg;
        flight.lat = (flight.lat + rng.random_range(-pj..=pj)).clamp(-90.0, 90.0);
        flight.lng = wrap_lng(flight.lng + rng.random_range(-pj..=pj));

        let aj = cfg.altitude_jitter_ft;
        flight.altitude = (flight.altitude + rng.random_range(-aj..=aj))
            .clamp(cfg.min_altitude_ft, cfg.max_altitude_ft);

        let sj = cfg.speed_jitter_kt;
        flight.speed =
            (flight.speed + rng.random_range(-sj..=sj)).clamp(cfg.min_speed_kt, cfg.max_speed_kt);

        let hj = cfg.heading_jitter_deg;
        flight.heading = wrap_heading(flight.heading + rng.random_range(-hj..=hj));

        flight.status = self.roll_status(rng, flight.status);
        flight.updated_at = Utc::now();

        let fix = flight.current_fix();
        flight.push_fix(fix, cfg.history_capacity);
    }

    /// Evaluate status transitions with independent per-tick rolls.
    ///
    /// At most one transition applies per tick, in fixed precedence
    /// lost-comm -> delayed -> landed, so overlapping triggers resolve
    /// deterministically. Recovery has the lowest precedence.
    fn roll_status(&self, rng: &mut impl Rng, current: FlightStatus) -> FlightStatus {
        let cfg = &self.config;
        if rng.random_bool(cfg.lost_comm_probability) {
            FlightStatus::LostComm
        } else if rng.random_bool(cfg.delayed_probability) {
            FlightStatus::Delayed
        } else if rng.random_bool(cfg.landed_probability) {
            FlightStatus::Landed
        } else if matches!(current, FlightStatus::Delayed | FlightStatus::LostComm)
            && rng.random_bool(cfg.recovery_probability)
        {
            FlightStatus::OnTime
        } else {
            current
        }
    }
}

fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> Simulator {
        Simulator::new(SimConfig::default()).unwrap()
    }

    #[test]
    fn invalid_configs_fail_fast() {
        let mut cfg = SimConfig {
            flight_count: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidFlightCount(0))
        ));

        cfg = SimConfig::default();
        cfg.bounds.min_lat = cfg.bounds.max_lat + 1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidBounds(_))));

        cfg = SimConfig::default();
        cfg.min_altitude_ft = cfg.max_altitude_ft;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidRange { field: "altitude", .. })
        ));

        cfg = SimConfig::default();
        cfg.lost_comm_probability = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn seeded_flights_start_inside_bounds() {
        let sim = simulator();
        let flights = sim.seed_flights(20);
        assert_eq!(flights.len(), 20);
        for flight in &flights {
            assert!(sim.config().bounds.contains(flight.lat, flight.lng));
            assert_eq!(flight.status, FlightStatus::OnTime);
            assert_eq!(flight.history.len(), 1);
        }
    }

    #[test]
    fn flight_ids_are_unique() {
        let sim = simulator();
        let flights = sim.seed_flights(50);
        let ids: std::collections::HashSet<_> = flights.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn values_stay_in_domain_over_many_ticks() {
        let sim = simulator();
        let cfg = sim.config().clone();
        let mut flights = sim.seed_flights(10);
        for _ in 0..200 {
            sim.tick(&mut flights);
        }
        for flight in &flights {
            assert!(flight.altitude >= cfg.min_altitude_ft && flight.altitude <= cfg.max_altitude_ft);
            assert!(flight.speed >= cfg.min_speed_kt && flight.speed <= cfg.max_speed_kt);
            assert!(flight.heading >= 0.0 && flight.heading < 360.0);
            assert!(flight.history.len() <= cfg.history_capacity);
        }
    }

    #[test]
    fn landed_flights_are_frozen() {
        let sim = simulator();
        let mut flights = sim.seed_flights(1);
        flights[0].status = FlightStatus::Landed;
        let before = flights[0].clone();
        sim.tick(&mut flights);
        assert_eq!(flights[0].lat, before.lat);
        assert_eq!(flights[0].lng, before.lng);
        assert_eq!(flights[0].status, FlightStatus::Landed);
        assert_eq!(flights[0].history.len(), before.history.len());
    }

    #[test]
    fn history_is_fifo_under_ticking() {
        let mut cfg = SimConfig::default();
        cfg.history_capacity = 5;
        let sim = Simulator::new(cfg).unwrap();
        let mut flights = sim.seed_flights(1);
        for _ in 0..20 {
            sim.tick(&mut flights);
        }
        let history = &flights[0].history;
        assert_eq!(history.len(), 5);
        for pair in history.iter().zip(history.iter().skip(1)) {
            assert!(pair.0.timestamp <= pair.1.timestamp);
        }
    }
}
