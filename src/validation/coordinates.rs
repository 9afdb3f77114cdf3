//! Coordinate validity checks shared by every producer of coordinates

use crate::core::constants::{MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG};
use thiserror::Error;

/// Reasons a coordinate or position reading is rejected
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),
    #[error("Invalid accuracy: {0}")]
    InvalidAccuracy(f64),
    #[error("Invalid distance: {0}")]
    InvalidDistance(f64),
}

/// True when both values are finite and inside the geographic ranges
pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    validate_coordinate(lat, lng).is_ok()
}

pub fn validate_coordinate(lat: f64, lng: f64) -> Result<(), CoordinateError> {
    if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordinateError::InvalidLatitude(lat));
    }
    if !lng.is_finite() || !(MIN_LNG..=MAX_LNG).contains(&lng) {
        return Err(CoordinateError::InvalidLongitude(lng));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ranges() {
        assert!(is_valid_coordinate(0.0, 0.0));
        assert!(is_valid_coordinate(-90.0, 180.0));
        assert!(!is_valid_coordinate(91.0, 0.0));
        assert!(!is_valid_coordinate(0.0, 181.0));
        assert!(!is_valid_coordinate(f64::INFINITY, 0.0));
    }

    #[test]
    fn test_error_identifies_axis() {
        assert_eq!(
            validate_coordinate(12.0, -200.0),
            Err(CoordinateError::InvalidLongitude(-200.0))
        );
        assert_eq!(
            validate_coordinate(-95.0, 0.0),
            Err(CoordinateError::InvalidLatitude(-95.0))
        );
    }
}
