//! Degrees-minutes-seconds notation
//!
//! Accepts both ASCII and typographic glyphs: `°`/`º` for degrees,
//! `'`/`′`/`’` for minutes, `"`/`″`/`”`/`''` for seconds. Each component ends
//! with a hemisphere letter which fixes both its axis and its sign.

use crate::processing::parser::{CoordinateFormat, FormatParser, ParsedCoordinate};
use regex::Regex;
use std::sync::OnceLock;

const COMPONENT: &str = concat!(
    r"(\d+(?:\.\d+)?)\s*[°º˚]?\s*",
    r#"(?:(\d+(?:\.\d+)?)\s*['′’]\s*)?"#,
    r#"(?:(\d+(?:\.\d+)?)\s*(?:"|″|”|''|′′)\s*)?"#,
    r"([NSEWnsew])",
);

/// Groups captured per component: degrees, minutes, seconds, hemisphere
const GROUPS_PER_COMPONENT: usize = 4;

fn dms_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!(r"^\s*{COMPONENT}\s*[,;]?\s*{COMPONENT}\s*$");
        Regex::new(&pattern).unwrap()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

/// One hemisphere-tagged angle
#[derive(Debug, Clone, Copy)]
struct Component {
    axis: Axis,
    value: f64,
}

fn parse_component(captures: &regex::Captures<'_>, offset: usize) -> Option<Component> {
    let number = |index: usize| -> Option<f64> {
        match captures.get(offset + index) {
            Some(m) => m.as_str().parse::<f64>().ok(),
            None => Some(0.0),
        }
    };

    let degrees = number(1)?;
    let minutes = number(2)?;
    let seconds = number(3)?;
    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    let hemisphere = captures.get(offset + 4)?.as_str().to_ascii_uppercase();
    let (axis, sign) = match hemisphere.as_str() {
        "N" => (Axis::Latitude, 1.0),
        "S" => (Axis::Latitude, -1.0),
        "E" => (Axis::Longitude, 1.0),
        "W" => (Axis::Longitude, -1.0),
        _ => return None,
    };

    Some(Component {
        axis,
        value: sign * (degrees + minutes / 60.0 + seconds / 3600.0),
    })
}

/// Parser for hemisphere-suffixed degrees/minutes/seconds pairs
#[derive(Debug, Default, Clone, Copy)]
pub struct DmsParser;

impl FormatParser for DmsParser {
    fn format(&self) -> CoordinateFormat {
        CoordinateFormat::Dms
    }

    fn parse(&self, input: &str) -> Option<ParsedCoordinate> {
        let captures = dms_pattern().captures(input)?;
        let first = parse_component(&captures, 0)?;
        let second = parse_component(&captures, GROUPS_PER_COMPONENT)?;

        let (lat, lng) = match (first.axis, second.axis) {
            (Axis::Latitude, Axis::Longitude) => (first.value, second.value),
            (Axis::Longitude, Axis::Latitude) => (second.value, first.value),
            _ => return None,
        };

        ParsedCoordinate::checked(lat, lng, CoordinateFormat::Dms)
    }
}

fn format_angle(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let tenths_of_seconds = (value.abs() * 36_000.0).round() as u64;
    let degrees = tenths_of_seconds / 36_000;
    let minutes = (tenths_of_seconds % 36_000) / 600;
    let tenths = tenths_of_seconds % 600;
    format!(
        "{}°{:02}'{:02}.{}\"{}",
        degrees,
        minutes,
        tenths / 10,
        tenths % 10,
        hemisphere
    )
}

/// Render a coordinate in the notation `DmsParser` reads, to 0.1"
pub fn format_dms(lat: f64, lng: f64) -> String {
    format!("{} {}", format_angle(lat, 'N', 'S'), format_angle(lng, 'E', 'W'))
}
