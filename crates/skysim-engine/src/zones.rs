//! Built-in restricted zones for the default simulation region.

use skysim_core::{RestrictedZone, ZoneType};

/// Static zones covering the default seed region. Immutable after
/// startup; consumers only ever read them.
pub fn default_zones() -> Vec<RestrictedZone> {
    vec![
        RestrictedZone {
            id: "zone-bom".to_string(),
            name: "Chhatrapati Shivaji Maharaj International Airport".to_string(),
            center: [19.0896, 72.8656],
            radius: 30_000.0,
            zone_type: ZoneType::Airport,
        },
        RestrictedZone {
            id: "zone-del".to_string(),
            name: "Indira Gandhi International Airport".to_string(),
            center: [28.5562, 77.1000],
            radius: 30_000.0,
            zone_type: ZoneType::Airport,
        },
        RestrictedZone {
            id: "zone-barc".to_string(),
            name: "Bhabha Atomic Research Centre".to_string(),
            center: [19.0322, 72.9232],
            radius: 5_000.0,
            zone_type: ZoneType::Restricted,
        },
        RestrictedZone {
            id: "zone-lohegaon".to_string(),
            name: "Lohegaon Air Force Station".to_string(),
            center: [18.5793, 73.9089],
            radius: 20_000.0,
            zone_type: ZoneType::Military,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_ids_are_unique() {
        let zones = default_zones();
        let ids: std::collections::HashSet<_> = zones.iter().map(|z| z.id.clone()).collect();
        assert_eq!(ids.len(), zones.len());
    }
}
