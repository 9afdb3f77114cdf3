//! Sensor abstraction layer
//!
//! Position and orientation arrive from platform callbacks at irregular
//! rates. Each source queues what it receives and the compass drains the
//! queues once per display cycle.

pub mod sources;
pub mod mock;
pub mod error;

pub use sources::{OrientationSource, PositionSource};
pub use mock::{MockOrientationSource, MockPositionSource};
pub use error::{SensorError, SensorResult};

/// Which orientation stream a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationChannel {
    /// Dedicated north-referenced stream
    Absolute,
    /// General stream whose readings may or may not be north-referenced
    Standard,
}

/// Raw orientation reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationReading {
    pub channel: OrientationChannel,
    /// Rotation about the vertical axis, counter-clockwise degrees
    pub alpha: Option<f64>,
    /// Whether `alpha` is referenced to north
    pub absolute: bool,
    /// Platform-fused clockwise compass heading, when the platform has one
    pub compass_heading: Option<f64>,
    pub timestamp_ms: u64,
}

impl OrientationReading {
    /// Reading from the absolute channel; `None` while the sensor calibrates
    pub fn absolute(alpha: Option<f64>, timestamp_ms: u64) -> Self {
        Self {
            channel: OrientationChannel::Absolute,
            alpha,
            absolute: true,
            compass_heading: None,
            timestamp_ms,
        }
    }

    /// Reading from the standard channel
    pub fn standard(alpha: Option<f64>, absolute: bool, timestamp_ms: u64) -> Self {
        Self {
            channel: OrientationChannel::Standard,
            alpha,
            absolute,
            compass_heading: None,
            timestamp_ms,
        }
    }

    /// Standard-channel reading carrying a fused compass heading
    pub fn fused(compass_heading: f64, timestamp_ms: u64) -> Self {
        Self {
            channel: OrientationChannel::Standard,
            alpha: None,
            absolute: false,
            compass_heading: Some(compass_heading),
            timestamp_ms,
        }
    }
}
