//! Sensor source traits

use crate::core::Position;
use crate::hardware::{OrientationChannel, OrientationReading, SensorResult};

/// Stream of position fixes from the platform
pub trait PositionSource {
    /// Subscribe to updates
    fn start(&mut self) -> SensorResult<()>;

    /// Unsubscribe; later polls return nothing
    fn stop(&mut self);

    fn is_active(&self) -> bool;

    /// Next pending fix.
    /// Returns Ok(None) when nothing new arrived (non-blocking)
    /// Returns Err(code) when the platform reported an error
    fn poll(&mut self) -> SensorResult<Option<Position>>;
}

/// Stream of raw orientation readings on one channel
pub trait OrientationSource {
    fn channel(&self) -> OrientationChannel;

    fn start(&mut self) -> SensorResult<()>;

    fn stop(&mut self);

    fn is_active(&self) -> bool;

    /// Next pending reading, or None when nothing new arrived
    fn poll(&mut self) -> Option<OrientationReading>;
}
