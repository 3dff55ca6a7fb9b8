pub mod error;
pub mod models;
pub mod monitor;
pub mod sim;
pub mod spatial;

pub use error::ConfigError;
pub use models::{
    Alert, AlertKind, AlertSeverity, FlightState, FlightStatus, PositionFix, RestrictedZone,
    ZoneType, DEFAULT_HISTORY_CAPACITY,
};
pub use monitor::{AlertKey, AlertMonitor};
pub use sim::{SimConfig, Simulator};
pub use spatial::{haversine_distance, GeoBounds};
