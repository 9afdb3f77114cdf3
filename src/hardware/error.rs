//! Sensor error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes reported by position and orientation sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorError {
    /// The user refused access to the sensor
    #[error("Sensor permission denied")]
    PermissionDenied,
    /// The platform has no such sensor or it failed
    #[error("Sensor unavailable")]
    Unavailable,
    /// No reading arrived in the source's own time limit
    #[error("Sensor timed out")]
    Timeout,
}

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

impl SensorError {
    /// Whether the source may still deliver readings after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SensorError::PermissionDenied)
    }
}
