//! Core data models for the flight state engine.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default capacity of the per-flight recent-history ring.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One recorded position sample for a flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    pub heading: f64,
    pub altitude: f64,
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

/// Current state of a simulated flight.
///
/// Owned and mutated exclusively by the tick driver; everyone else sees
/// immutable snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightState {
    /// Stable identifier, immutable for the lifetime of the entity.
    pub id: String,
    pub flight_number: String,
    pub lat: f64,
    pub lng: f64,
    /// Altitude in feet, clamped to the configured band.
    pub altitude: f64,
    /// Ground speed in knots, clamped to the configured band.
    pub speed: f64,
    /// Heading in degrees, wrapped to [0, 360).
    pub heading: f64,
    pub status: FlightStatus,
    /// Recent positions, oldest first. Length never exceeds the
    /// configured history capacity.
    pub history: VecDeque<PositionFix>,
    pub updated_at: DateTime<Utc>,
}

impl FlightState {
    /// Current position as a fix, stamped with the last update time.
    pub fn current_fix(&self) -> PositionFix {
        PositionFix {
            lat: self.lat,
            lng: self.lng,
            heading: self.heading,
            altitude: self.altitude,
            speed: self.speed,
            timestamp: self.updated_at,
        }
    }

    /// Append a fix to the history ring, evicting the oldest entry once
    /// `capacity` is reached.
    pub fn push_fix(&mut self, fix: PositionFix, capacity: usize) {
        while self.history.len() >= capacity.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(fix);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightStatus {
    /// Normal operation
    #[default]
    OnTime,
    /// Running behind schedule
    Delayed,
    /// On the ground; terminal for the simulation
    Landed,
    /// No telemetry; raises a high-severity alert
    LostComm,
}

// ========== RESTRICTED ZONES ==========

/// A circular restricted region. Immutable after initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictedZone {
    pub id: String,
    pub name: String,
    /// Center as [lat, lng] in decimal degrees.
    pub center: [f64; 2],
    /// Radius in meters.
    pub radius: f64,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
}

impl RestrictedZone {
    pub fn center_lat(&self) -> f64 {
        self.center[0]
    }

    pub fn center_lng(&self) -> f64 {
        self.center[1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Military,
    Airport,
    Restricted,
}

// ========== ALERTS ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    LostComm,
    RestrictedZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Medium,
    Low,
}

impl ZoneType {
    /// Severity of a zone-incursion alert for this zone type.
    pub fn alert_severity(&self) -> AlertSeverity {
        match self {
            ZoneType::Military => AlertSeverity::High,
            ZoneType::Restricted => AlertSeverity::Medium,
            ZoneType::Airport => AlertSeverity::Low,
        }
    }
}

/// A live monitored condition for a single flight.
///
/// Created when the condition transitions false -> true for its dedup
/// key and removed when it transitions back. At most one live alert
/// exists per key at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub flight_id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<ZoneType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_flight() -> FlightState {
        FlightState {
            id: "f-1".to_string(),
            flight_number: "AI101".to_string(),
            lat: 19.0,
            lng: 72.8,
            altitude: 31_000.0,
            speed: 450.0,
            heading: 270.0,
            status: FlightStatus::OnTime,
            history: VecDeque::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut flight = sample_flight();
        for i in 0..7 {
            let mut fix = flight.current_fix();
            fix.lat = i as f64;
            flight.push_fix(fix, 5);
        }
        assert_eq!(flight.history.len(), 5);
        assert_eq!(flight.history.front().unwrap().lat, 2.0);
        assert_eq!(flight.history.back().unwrap().lat, 6.0);
    }

    #[test]
    fn flight_snapshot_uses_wire_field_names() {
        let flight = sample_flight();
        let json = serde_json::to_value(&flight).unwrap();
        assert!(json.get("flightNumber").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("lng").is_some());
        assert_eq!(json["status"], "on-time");
    }

    #[test]
    fn status_and_zone_wire_names() {
        assert_eq!(
            serde_json::to_string(&FlightStatus::LostComm).unwrap(),
            "\"lost-comm\""
        );
        assert_eq!(
            serde_json::to_string(&AlertKind::RestrictedZone).unwrap(),
            "\"restricted-zone\""
        );
        assert_eq!(
            serde_json::to_string(&ZoneType::Military).unwrap(),
            "\"military\""
        );
    }

    #[test]
    fn alert_omits_zone_fields_when_absent() {
        let alert = Alert {
            id: "a-1".to_string(),
            flight_id: "f-1".to_string(),
            kind: AlertKind::LostComm,
            message: "lost".to_string(),
            timestamp: Utc::now(),
            severity: AlertSeverity::High,
            zone_id: None,
            zone_name: None,
            zone_type: None,
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert!(json.get("zoneId").is_none());
        assert_eq!(json["type"], "lost-comm");
        assert_eq!(json["severity"], "high");
    }
}
