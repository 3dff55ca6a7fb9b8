//! Geodesic math for zone checks and position bookkeeping.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using the Haversine formula.
///
/// This is the standard formula for calculating great-circle distance
/// between two points on a sphere given their latitudes and longitudes.
///
/// # Arguments
/// * `lat1`, `lng1` - First point coordinates in decimal degrees
/// * `lat2`, `lng2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lng2 - lng1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from point 1 to point 2 in degrees, 0 = north, 90 = east.
pub fn bearing_deg(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    wrap_heading(x.atan2(y).to_degrees())
}

/// Check whether a point lies within `radius_m` meters of a circle center.
///
/// Points exactly on the boundary count as inside.
pub fn within_radius(lat: f64, lng: f64, center_lat: f64, center_lng: f64, radius_m: f64) -> bool {
    haversine_distance(lat, lng, center_lat, center_lng) <= radius_m
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Wrap a heading in degrees into [0, 360).
pub fn wrap_heading(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Rectangular lat/lng region used to seed and contain the simulated population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    pub fn is_valid(&self) -> bool {
        self.min_lat < self.max_lat
            && self.min_lng < self.max_lng
            && self.min_lat >= -90.0
            && self.max_lat <= 90.0
            && self.min_lng >= -180.0
            && self.max_lng <= 180.0
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    /// Pick a uniformly random point inside the bounds.
    pub fn random_point(&self, rng: &mut impl Rng) -> (f64, f64) {
        let lat = rng.random_range(self.min_lat..self.max_lat);
        let lng = rng.random_range(self.min_lng..self.max_lng);
        (lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_same_point() {
        let dist = haversine_distance(19.0896, 72.8656, 19.0896, 72.8656);
        assert!(dist < 0.001);
    }

    #[test]
    fn haversine_one_degree_of_longitude_at_equator() {
        // One degree of longitude at the equator is ~111,195 m on a
        // 6,371 km sphere.
        let dist = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((dist - 111_195.0).abs() / 111_195.0 < 0.01, "got {dist}");
    }

    #[test]
    fn bearing_due_east() {
        let bearing = bearing_deg(0.0, 0.0, 0.0, 1.0);
        assert!((bearing - 90.0).abs() < 0.01);
    }

    #[test]
    fn within_radius_boundary_counts_as_inside() {
        // ~111 km north of the equator origin
        assert!(within_radius(1.0, 0.0, 0.0, 0.0, 112_000.0));
        assert!(!within_radius(1.0, 0.0, 0.0, 0.0, 110_000.0));
    }

    #[test]
    fn wrap_heading_into_domain() {
        assert_eq!(wrap_heading(360.0), 0.0);
        assert_eq!(wrap_heading(-10.0), 350.0);
        assert_eq!(wrap_heading(725.0), 5.0);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }

    #[test]
    fn random_point_stays_inside_bounds() {
        let bounds = GeoBounds {
            min_lat: 8.0,
            max_lat: 32.0,
            min_lng: 68.0,
            max_lng: 92.0,
        };
        let mut rng = rand::rng();
        for _ in 0..200 {
            let (lat, lng) = bounds.random_point(&mut rng);
            assert!(bounds.contains(lat, lng));
        }
    }
}
