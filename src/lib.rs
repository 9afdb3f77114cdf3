//! Castpoint
//!
//! Offline compass toward a chosen destination. Destinations come from typed
//! text (decimal pairs, degrees-minutes-seconds, map links, plus codes) or
//! from "casting": aiming the device and picking a distance, which projects
//! a point along the fused compass heading.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use core::{Coordinate, Destination, DestinationOrigin, Position, EARTH_RADIUS_M};
pub use algorithms::geodesy::{bearing, distance, project};
pub use algorithms::DistanceStepTable;
pub use processing::{
    CoordinateFormat, DestinationParser, FormatParser, HeadingFusion, HeadingReading,
    HeadingTier, ParseError, ParsedCoordinate,
};
pub use validation::{ArrivalEvaluator, CoordinateError};
pub use hardware::{
    OrientationChannel, OrientationReading, OrientationSource, PositionSource, SensorError,
    SensorResult,
};
pub use api::{
    ApiError, ApiResult, CallbackHandle, CastPhase, CastRefusal, CastSession, CompassApi,
    CompassEvent, CompassSnapshot, PositionStatus, Swipe, SwipeResult,
};
pub use utils::{CompassConfig, ConfigError, ConfigurationManager, JsonFileStore, KeyValueStore, MemoryStore};
