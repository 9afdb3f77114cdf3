use crate::core::Coordinate;
use crate::processing::dms::DmsParser;
use crate::processing::map_url::MapUrlParser;
use crate::processing::plus_code::PlusCodeParser;
use crate::validation::is_valid_coordinate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Text encodings a destination can be typed or pasted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateFormat {
    /// Two decimal numbers, e.g. `40.7128, -74.0060`
    Raw,
    /// Degrees, minutes, seconds with hemisphere letters
    Dms,
    /// Link copied from a map service
    MapUrl,
    /// Full Open Location Code
    Geocode,
}

impl fmt::Display for CoordinateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateFormat::Raw => write!(f, "raw"),
            CoordinateFormat::Dms => write!(f, "dms"),
            CoordinateFormat::MapUrl => write!(f, "map-url"),
            CoordinateFormat::Geocode => write!(f, "geocode"),
        }
    }
}

/// Normalized result of a successful parse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedCoordinate {
    pub lat: f64,
    pub lng: f64,
    pub format: CoordinateFormat,
}

impl ParsedCoordinate {
    /// Build a result only if the pair is a valid coordinate
    pub(crate) fn checked(lat: f64, lng: f64, format: CoordinateFormat) -> Option<Self> {
        is_valid_coordinate(lat, lng).then_some(Self { lat, lng, format })
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.lat, self.lng)
    }
}

/// Failure of the whole dispatch. Individual formats never report errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unrecognized coordinate format: {input:?}")]
    Unparseable { input: String },
}

/// One coordinate encoding.
///
/// `parse` returns `None` both for text in another format and for text in
/// this format with out-of-range values; callers cannot tell them apart.
pub trait FormatParser: Send + Sync {
    fn format(&self) -> CoordinateFormat;

    fn parse(&self, input: &str) -> Option<ParsedCoordinate>;
}

const NUMBER: &str = r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)";

fn raw_pair_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // lat, separator of comma and/or whitespace, lng
        let pattern = format!(r"^\s*({NUMBER})\s*(?:,\s*|\s+)({NUMBER})\s*$");
        Regex::new(&pattern).unwrap()
    })
}

/// Split a `lat,lng` style pair into numbers without range checks
pub(crate) fn split_decimal_pair(input: &str) -> Option<(f64, f64)> {
    let captures = raw_pair_pattern().captures(input)?;
    let lat = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let lng = captures.get(2)?.as_str().parse::<f64>().ok()?;
    Some((lat, lng))
}

/// Two signed decimal numbers separated by a comma and/or whitespace
#[derive(Debug, Default, Clone, Copy)]
pub struct RawPairParser;

impl FormatParser for RawPairParser {
    fn format(&self) -> CoordinateFormat {
        CoordinateFormat::Raw
    }

    fn parse(&self, input: &str) -> Option<ParsedCoordinate> {
        let (lat, lng) = split_decimal_pair(input)?;
        ParsedCoordinate::checked(lat, lng, CoordinateFormat::Raw)
    }
}

/// Tries each supported format in priority order.
///
/// Map links run first: their paths and queries carry number pairs that
/// the looser formats would otherwise claim.
pub struct DestinationParser {
    parsers: Vec<Box<dyn FormatParser>>,
}

impl Default for DestinationParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DestinationParser {
    pub fn new() -> Self {
        Self::with_parsers(vec![
            Box::new(MapUrlParser),
            Box::new(DmsParser),
            Box::new(PlusCodeParser),
            Box::new(RawPairParser),
        ])
    }

    /// Dispatcher over a custom priority list
    pub fn with_parsers(parsers: Vec<Box<dyn FormatParser>>) -> Self {
        Self { parsers }
    }

    /// Formats in the order they are tried
    pub fn formats(&self) -> Vec<CoordinateFormat> {
        self.parsers.iter().map(|parser| parser.format()).collect()
    }

    /// Parse destination text, returning the first format that matches
    pub fn parse(&self, input: &str) -> Result<ParsedCoordinate, ParseError> {
        let trimmed = input.trim();
        if !trimmed.is_empty() {
            for parser in &self.parsers {
                if let Some(parsed) = parser.parse(trimmed) {
                    tracing::debug!(format = %parsed.format, lat = parsed.lat, lng = parsed.lng, "parsed destination");
                    return Ok(parsed);
                }
            }
        }

        Err(ParseError::Unparseable {
            input: input.to_string(),
        })
    }
}
