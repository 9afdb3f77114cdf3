//! Destination text parsing and heading fusion

pub mod parser;
pub mod dms;
pub mod map_url;
pub mod plus_code;
pub mod heading;

pub use parser::{CoordinateFormat, DestinationParser, FormatParser, ParseError, ParsedCoordinate};
pub use heading::{HeadingFusion, HeadingReading, HeadingTier};
