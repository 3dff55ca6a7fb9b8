//! Zone and communication-loss alert monitoring.
//!
//! The monitor is an edge-triggered dedup state machine: an alert is
//! created when its condition transitions false -> true for a dedup key
//! and removed when the condition transitions back. While a condition
//! stays true its alert is never duplicated.

use std::collections::HashMap;

use chrono::Utc;

use crate::models::{Alert, AlertKind, AlertSeverity, FlightState, FlightStatus, RestrictedZone};
use crate::spatial::haversine_distance;

/// Composite identity for a monitored condition instance.
///
/// A structured key rather than a concatenated string so creation and
/// removal sites can never drift apart on key format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub flight_id: String,
    pub kind: AlertKind,
    /// Set only for restricted-zone alerts.
    pub zone_id: Option<String>,
}

impl AlertKey {
    fn lost_comm(flight_id: &str) -> Self {
        Self {
            flight_id: flight_id.to_string(),
            kind: AlertKind::LostComm,
            zone_id: None,
        }
    }

    fn zone(flight_id: &str, zone_id: &str) -> Self {
        Self {
            flight_id: flight_id.to_string(),
            kind: AlertKind::RestrictedZone,
            zone_id: Some(zone_id.to_string()),
        }
    }
}

/// Stateful alert engine over zone membership and comm status.
///
/// Explicitly constructed and owned; reset on reseed. Note that there
/// is no cool-down after dismissal: if the triggering condition still
/// holds on the next evaluation, a fresh alert (new id) is created
/// immediately. That matches the intended behavior but can be noisy.
#[derive(Debug, Default)]
pub struct AlertMonitor {
    active: HashMap<AlertKey, Alert>,
}

impl AlertMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate every flight against comm status and every zone.
    ///
    /// Returns only the alerts newly created this evaluation (the
    /// delta); use [`AlertMonitor::active_alerts`] for the full live set.
    pub fn evaluate(&mut self, flights: &[FlightState], zones: &[RestrictedZone]) -> Vec<Alert> {
        let mut created = Vec::new();

        for flight in flights {
            let comm_key = AlertKey::lost_comm(&flight.id);
            if flight.status == FlightStatus::LostComm {
                if !self.active.contains_key(&comm_key) {
                    let alert = Alert {
                        id: uuid::Uuid::new_v4().to_string(),
                        flight_id: flight.id.clone(),
                        kind: AlertKind::LostComm,
                        message: format!(
                            "Lost communication with flight {}",
                            flight.flight_number
                        ),
                        timestamp: Utc::now(),
                        severity: AlertSeverity::High,
                        zone_id: None,
                        zone_name: None,
                        zone_type: None,
                    };
                    created.push(alert.clone());
                    self.active.insert(comm_key, alert);
                }
            } else {
                self.active.remove(&comm_key);
            }

            for zone in zones {
                let key = AlertKey::zone(&flight.id, &zone.id);
                let distance = haversine_distance(
                    flight.lat,
                    flight.lng,
                    zone.center_lat(),
                    zone.center_lng(),
                );
                if distance <= zone.radius {
                    if !self.active.contains_key(&key) {
                        let alert = Alert {
                            id: uuid::Uuid::new_v4().to_string(),
                            flight_id: flight.id.clone(),
                            kind: AlertKind::RestrictedZone,
                            message: format!(
                                "Flight {} entered {} ({:?} zone)",
                                flight.flight_number, zone.name, zone.zone_type
                            ),
                            timestamp: Utc::now(),
                            severity: zone.zone_type.alert_severity(),
                            zone_id: Some(zone.id.clone()),
                            zone_name: Some(zone.name.clone()),
                            zone_type: Some(zone.zone_type),
                        };
                        created.push(alert.clone());
                        self.active.insert(key, alert);
                    }
                } else {
                    self.active.remove(&key);
                }
            }
        }

        created
    }

    /// Dismiss an alert by id, clearing both the alert and its dedup
    /// key. The condition may recreate it on the next evaluation.
    pub fn dismiss(&mut self, alert_id: &str) -> bool {
        let key = self
            .active
            .iter()
            .find(|(_, alert)| alert.id == alert_id)
            .map(|(key, _)| key.clone());
        match key {
            Some(key) => {
                self.active.remove(&key);
                true
            }
            None => false,
        }
    }

    /// All currently live alerts.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.active.values().cloned().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Drop all alerts and dedup state, e.g. after a population reseed.
    pub fn reset(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ZoneType;
    use std::collections::VecDeque;

    fn flight_at(id: &str, lat: f64, lng: f64) -> FlightState {
        FlightState {
            id: id.to_string(),
            flight_number: format!("AI{}", &id[id.len().saturating_sub(3)..]),
            lat,
            lng,
            altitude: 30_000.0,
            speed: 420.0,
            heading: 90.0,
            status: FlightStatus::OnTime,
            history: VecDeque::new(),
            updated_at: Utc::now(),
        }
    }

    fn mumbai_airport_zone() -> RestrictedZone {
        RestrictedZone {
            id: "zone-bom".to_string(),
            name: "Chhatrapati Shivaji Maharaj International Airport".to_string(),
            center: [19.0896, 72.8656],
            radius: 30_000.0,
            zone_type: ZoneType::Airport,
        }
    }

    #[test]
    fn flight_at_zone_center_raises_low_severity_alert() {
        let mut monitor = AlertMonitor::new();
        let zone = mumbai_airport_zone();
        let mut flight = flight_at("f-001", 19.0896, 72.8656);

        let created = monitor.evaluate(&[flight.clone()], &[zone.clone()]);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].kind, AlertKind::RestrictedZone);
        assert_eq!(created[0].severity, AlertSeverity::Low);
        assert_eq!(created[0].zone_id.as_deref(), Some("zone-bom"));

        // Still inside: no duplicate while the condition holds.
        let created = monitor.evaluate(&[flight.clone()], &[zone.clone()]);
        assert!(created.is_empty());
        assert_eq!(monitor.active_count(), 1);

        // Moving far away removes the alert.
        flight.lat = 0.0;
        flight.lng = 0.0;
        let created = monitor.evaluate(&[flight], &[zone]);
        assert!(created.is_empty());
        assert_eq!(monitor.active_count(), 0);
    }

    #[test]
    fn zone_severity_follows_zone_type() {
        let mut monitor = AlertMonitor::new();
        let mut military = mumbai_airport_zone();
        military.id = "zone-mil".to_string();
        military.zone_type = ZoneType::Military;
        let mut restricted = mumbai_airport_zone();
        restricted.id = "zone-res".to_string();
        restricted.zone_type = ZoneType::Restricted;

        let flight = flight_at("f-002", 19.0896, 72.8656);
        let mut created = monitor.evaluate(&[flight], &[military, restricted]);
        created.sort_by_key(|alert| alert.zone_id.clone());
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].severity, AlertSeverity::High);
        assert_eq!(created[1].severity, AlertSeverity::Medium);
    }

    #[test]
    fn lost_comm_alert_follows_status() {
        let mut monitor = AlertMonitor::new();
        let mut flight = flight_at("f-003", 10.0, 80.0);
        flight.status = FlightStatus::LostComm;

        let created = monitor.evaluate(&[flight.clone()], &[]);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].kind, AlertKind::LostComm);
        assert_eq!(created[0].severity, AlertSeverity::High);

        // Same status: no duplicate.
        assert!(monitor.evaluate(&[flight.clone()], &[]).is_empty());

        flight.status = FlightStatus::OnTime;
        assert!(monitor.evaluate(&[flight], &[]).is_empty());
        assert_eq!(monitor.active_count(), 0);
    }

    #[test]
    fn dismissal_allows_immediate_recreation_with_new_id() {
        let mut monitor = AlertMonitor::new();
        let zone = mumbai_airport_zone();
        let flight = flight_at("f-004", 19.0896, 72.8656);

        let created = monitor.evaluate(&[flight.clone()], &[zone.clone()]);
        let first_id = created[0].id.clone();

        assert!(monitor.dismiss(&first_id));
        assert_eq!(monitor.active_count(), 0);

        // Condition still true: exactly one fresh alert, new id.
        let created = monitor.evaluate(&[flight], &[zone]);
        assert_eq!(created.len(), 1);
        assert_ne!(created[0].id, first_id);
    }

    #[test]
    fn dismissing_unknown_alert_is_a_no_op() {
        let mut monitor = AlertMonitor::new();
        assert!(!monitor.dismiss("nope"));
    }

    #[test]
    fn reset_clears_all_state() {
        let mut monitor = AlertMonitor::new();
        let mut flight = flight_at("f-005", 19.0896, 72.8656);
        flight.status = FlightStatus::LostComm;
        monitor.evaluate(&[flight.clone()], &[mumbai_airport_zone()]);
        assert_eq!(monitor.active_count(), 2);

        monitor.reset();
        assert_eq!(monitor.active_count(), 0);

        // Conditions still true re-create alerts after reset.
        let created = monitor.evaluate(&[flight], &[mumbai_airport_zone()]);
        assert_eq!(created.len(), 2);
    }
}
