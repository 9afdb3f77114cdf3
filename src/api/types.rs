//! Common API types

use crate::api::session::CastRefusal;
use crate::core::Destination;
use crate::hardware::SensorError;
use crate::processing::{HeadingTier, ParseError};
use crate::utils::{ConfigError, StoreError};
use crate::validation::CoordinateError;
use serde::Serialize;
use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Cast(#[from] CastRefusal),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// State of the position stream as the consumer should present it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionStatus {
    /// No fix yet
    Waiting,
    Tracking,
    /// Last thing the source reported was an error
    Error(SensorError),
}

/// Everything a renderer needs for one display cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompassSnapshot {
    /// Clockwise degrees from north, if known
    pub heading: Option<f64>,
    pub tier: HeadingTier,
    /// The heading has not been refreshed recently
    pub heading_stale: bool,
    /// Bearing from the device to the destination
    pub bearing: Option<f64>,
    pub distance_m: Option<f64>,
    /// Arrow rotation: destination bearing relative to the heading
    pub relative_bearing: Option<f64>,
    pub arrived: bool,
    pub position_status: PositionStatus,
}

/// Notifications delivered to registered callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompassEvent {
    /// A new destination replaced the previous one
    DestinationCommitted(Destination),
    /// The device entered the arrival radius
    Arrived(Destination),
}
