//! Core data types for the compass

use crate::validation::coordinates::{validate_coordinate, CoordinateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        validate_coordinate(lat, lng)?;
        Ok(Self { lat, lng })
    }

    /// Create a coordinate without range checks.
    ///
    /// Only for values produced by the geodesy engine, which are already
    /// normalized into the valid ranges.
    pub(crate) fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Latest reading of the device position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    /// Horizontal accuracy radius reported by the position source (m)
    pub accuracy_m: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64, accuracy_m: f64) -> Result<Self, CoordinateError> {
        validate_coordinate(lat, lng)?;
        if !accuracy_m.is_finite() || accuracy_m < 0.0 {
            return Err(CoordinateError::InvalidAccuracy(accuracy_m));
        }
        Ok(Self { lat, lng, accuracy_m })
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.lat, self.lng)
    }
}

/// How a destination was set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationOrigin {
    /// Typed or pasted text
    Typed,
    /// Projected from the device heading during a cast session
    Cast,
}

impl fmt::Display for DestinationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationOrigin::Typed => write!(f, "typed"),
            DestinationOrigin::Cast => write!(f, "cast"),
        }
    }
}

/// Navigation target. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub lat: f64,
    pub lng: f64,
    pub origin: DestinationOrigin,
    /// Distance from the device when the destination was set (m)
    pub initial_distance_meters: f64,
}

impl Destination {
    pub fn new(
        coordinate: Coordinate,
        origin: DestinationOrigin,
        initial_distance_meters: f64,
    ) -> Result<Self, CoordinateError> {
        validate_coordinate(coordinate.lat, coordinate.lng)?;
        if !initial_distance_meters.is_finite() || initial_distance_meters < 0.0 {
            return Err(CoordinateError::InvalidDistance(initial_distance_meters));
        }
        Ok(Self {
            lat: coordinate.lat,
            lng: coordinate.lng,
            origin,
            initial_distance_meters,
        })
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.0001, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_position_rejects_negative_accuracy() {
        assert!(Position::new(40.0, -74.0, 5.0).is_ok());
        assert_eq!(
            Position::new(40.0, -74.0, -1.0),
            Err(CoordinateError::InvalidAccuracy(-1.0))
        );
    }

    #[test]
    fn test_destination_serializes_camel_case() {
        let dest = Destination::new(
            Coordinate::new(40.7128, -74.006).unwrap(),
            DestinationOrigin::Cast,
            250.0,
        )
        .unwrap();

        let json = serde_json::to_value(dest).unwrap();
        assert_eq!(json["origin"], "cast");
        assert_eq!(json["initialDistanceMeters"], 250.0);
        assert_eq!(json["lat"], 40.7128);
    }
}
