//! Physical constants and system parameters

/// Mean Earth radius used by every spherical computation (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Smallest arrival radius regardless of how good the position fix is (m)
pub const ARRIVAL_MIN_RADIUS_M: f64 = 10.0;

/// Storage key of the persisted destination record
pub const DESTINATION_KEY: &str = "castpoint.destination";

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;
