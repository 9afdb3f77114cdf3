//! Spherical geodesy on a mean-radius Earth
//!
//! All functions are pure and total over valid coordinates:
//! - Forward azimuth (initial great-circle bearing)
//! - Haversine great-circle distance
//! - Direct geodesic problem (project a point along a bearing)
//! - Arrow rotation helpers for heading-relative display

use crate::core::{Coordinate, EARTH_RADIUS_M};
use nalgebra::Vector3;

/// Dot product below which two n-vectors count as antipodal
const ANTIPODAL_DOT_THRESHOLD: f64 = -1.0 + 1e-12;

/// Normalize any finite angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Wrap a longitude into [-180, 180]
fn normalize_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Forward azimuth from `from` to `to`, clockwise from true north in [0, 360).
///
/// Returns 0 when both points coincide.
pub fn bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat_a = from.lat.to_radians();
    let lat_b = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * delta_lng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Haversine great-circle distance in meters
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let delta_lat = lat_b - lat_a;
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h marginally outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Solve the direct geodesic problem: the point reached by travelling
/// `distance_m` along the great circle leaving `origin` at `bearing_deg`.
pub fn project(origin: &Coordinate, bearing_deg: f64, distance_m: f64) -> Coordinate {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat_a = origin.lat.to_radians();
    let lng_a = origin.lng.to_radians();

    let sin_lat_b = (lat_a.sin() * delta.cos() + lat_a.cos() * delta.sin() * theta.cos())
        .clamp(-1.0, 1.0);
    let lat_b = sin_lat_b.asin();
    let delta_lng = (theta.sin() * delta.sin() * lat_a.cos())
        .atan2(delta.cos() - lat_a.sin() * sin_lat_b);

    Coordinate::new_unchecked(
        lat_b.to_degrees(),
        normalize_longitude((lng_a + delta_lng).to_degrees()),
    )
}

/// Angle the destination arrow is rotated by on a display aligned with `heading_deg`
pub fn relative_bearing(bearing_deg: f64, heading_deg: f64) -> f64 {
    normalize_degrees(bearing_deg - heading_deg)
}

/// Signed shortest rotation from one angle to another, in (-180, 180].
///
/// Consumers animating the arrow step toward the target by this delta so
/// the arrow never spins the long way around across north.
pub fn shortest_rotation(from_deg: f64, to_deg: f64) -> f64 {
    let delta = normalize_degrees(to_deg - from_deg);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Unit n-vector (earth-centred normal) of a coordinate
fn n_vector(coordinate: &Coordinate) -> Vector3<f64> {
    let lat = coordinate.lat.to_radians();
    let lng = coordinate.lng.to_radians();
    Vector3::new(lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin())
}

/// True when the points sit on opposite ends of an Earth diameter, where
/// the initial bearing between them is undefined.
pub fn is_antipodal(a: &Coordinate, b: &Coordinate) -> bool {
    n_vector(a).dot(&n_vector(b)) <= ANTIPODAL_DOT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for (lat, lng) in [(0.0, 0.0), (40.0, -74.0), (-89.9, 179.9), (90.0, 0.0)] {
            let a = coord(lat, lng);
            assert!(distance(&a, &a).abs() < 1e-6);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = coord(51.5074, -0.1278);
        let b = coord(48.8566, 2.3522);
        assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-6);
        // London to Paris, ~343.5 km on a 6371 km sphere
        assert!((distance(&a, &b) - 343_556.0).abs() < 500.0);
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = coord(0.0, 0.0);
        assert!((bearing(&origin, &coord(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_range() {
        let points = [
            coord(40.0, -74.0),
            coord(-33.86, 151.2),
            coord(89.0, 10.0),
            coord(-89.0, -170.0),
            coord(0.0, 179.9),
            coord(0.0, -179.9),
        ];
        for a in &points {
            for b in &points {
                if a != b {
                    let value = bearing(a, b);
                    assert!((0.0..360.0).contains(&value), "bearing {} out of range", value);
                }
            }
        }
    }

    #[test]
    fn test_project_round_trip() {
        let a = coord(40.0, -74.0);
        let b = coord(40.1, -74.2);
        let projected = project(&a, bearing(&a, &b), distance(&a, &b));
        assert!(distance(&projected, &b) < 1.0);
    }

    #[test]
    fn test_project_round_trip_long_range() {
        let a = coord(-33.86, 151.2);
        let b = coord(35.68, 139.69);
        let projected = project(&a, bearing(&a, &b), distance(&a, &b));
        assert!(distance(&projected, &b) < 1.0);
    }

    #[test]
    fn test_project_zero_distance() {
        let a = coord(12.5, 99.1);
        let projected = project(&a, 45.0, 0.0);
        assert!((projected.lat - a.lat).abs() < 1e-12);
        assert!((projected.lng - a.lng).abs() < 1e-12);
    }

    #[test]
    fn test_project_across_antimeridian() {
        let a = coord(0.0, 179.99);
        let projected = project(&a, 90.0, 5_000.0);
        assert!(projected.lng.is_finite());
        assert!(projected.lng < -179.9);
        assert!((-180.0..=180.0).contains(&projected.lng));
    }

    #[test]
    fn test_project_from_pole_is_finite() {
        let pole = coord(90.0, 0.0);
        let projected = project(&pole, 180.0, 100_000.0);
        assert!(projected.lat.is_finite() && projected.lng.is_finite());
        assert!(projected.lat < 90.0);
    }

    #[test]
    fn test_relative_bearing_and_rotation() {
        assert_eq!(relative_bearing(10.0, 350.0), 20.0);
        assert_eq!(relative_bearing(350.0, 10.0), 340.0);
        assert_eq!(shortest_rotation(350.0, 10.0), 20.0);
        assert_eq!(shortest_rotation(10.0, 350.0), -20.0);
        assert_eq!(shortest_rotation(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_antipodal_detection() {
        assert!(is_antipodal(&coord(10.0, 20.0), &coord(-10.0, -160.0)));
        assert!(!is_antipodal(&coord(10.0, 20.0), &coord(-10.0, -150.0)));
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        let tiny = normalize_degrees(-1e-20);
        assert!((0.0..360.0).contains(&tiny));
    }
}
