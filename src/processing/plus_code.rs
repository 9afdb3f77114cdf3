//! Open Location Code ("plus code") support for full-length codes
//!
//! A full code is eight symbols, the `+` separator and at least two more
//! symbols. The first ten symbols are five latitude/longitude pairs, each
//! narrowing a 20°x20° cell by a factor of 20 per axis; up to five further
//! symbols index a 5-row x 4-column grid inside the current cell.
//!
//! Short codes (with the leading symbols removed) need a reference location
//! to recover and are not supported.

use crate::processing::parser::{CoordinateFormat, FormatParser, ParsedCoordinate};
use regex::Regex;
use std::sync::OnceLock;

/// The 20 code symbols, in value order
pub const CODE_ALPHABET: &[u8; 20] = b"23456789CFGHJMPQRVWX";

pub const SEPARATOR: char = '+';
pub const SEPARATOR_POSITION: usize = 8;

/// Digits covered by the pair section
const PAIR_CODE_LENGTH: usize = 10;
/// Digits beyond which extra precision is ignored
const MAX_DIGIT_COUNT: usize = 15;

const ENCODING_BASE: u32 = 20;
const GRID_ROWS: u32 = 5;
const GRID_COLUMNS: u32 = 4;

/// Resolution of the first pair, in degrees
const FIRST_PAIR_RESOLUTION: f64 = 20.0;

const LATITUDE_MAX: f64 = 90.0;
const LONGITUDE_MAX: f64 = 180.0;

/// Integer scale of latitude at full precision: 20^3 * 5^5
const LAT_INTEGER_MULTIPLIER: i64 = 8_000 * 3_125;
/// Integer scale of longitude at full precision: 20^3 * 4^5
const LNG_INTEGER_MULTIPLIER: i64 = 8_000 * 1_024;

fn full_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[23456789CFGHJMPQRVWX]{8}\+[23456789CFGHJMPQRVWX]{2,}$").unwrap()
    })
}

/// Value of a code symbol, or `None` outside the alphabet
fn symbol_value(symbol: u8) -> Option<u32> {
    CODE_ALPHABET
        .iter()
        .position(|&candidate| candidate == symbol.to_ascii_uppercase())
        .map(|index| index as u32)
}

/// Bounding box of the cell a code names
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeArea {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
    /// Significant digits decoded (separator excluded)
    pub code_length: usize,
}

impl CodeArea {
    pub fn center_lat(&self) -> f64 {
        ((self.south + self.north) / 2.0).min(LATITUDE_MAX)
    }

    pub fn center_lng(&self) -> f64 {
        ((self.west + self.east) / 2.0).min(LONGITUDE_MAX)
    }

    pub fn lat_height(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_width(&self) -> f64 {
        self.east - self.west
    }
}

/// Uppercase a full code and check its shape.
///
/// The first two symbols must also keep the cell on the globe: a leading
/// latitude value of 9 or more would start at or beyond the north pole.
pub fn canonicalize(code: &str) -> Option<String> {
    let upper = code.trim().to_ascii_uppercase();
    if !full_code_pattern().is_match(&upper) {
        return None;
    }

    let bytes = upper.as_bytes();
    let first_lat = symbol_value(bytes[0])? as f64 * FIRST_PAIR_RESOLUTION;
    let first_lng = symbol_value(bytes[1])? as f64 * FIRST_PAIR_RESOLUTION;
    if first_lat >= 2.0 * LATITUDE_MAX || first_lng >= 2.0 * LONGITUDE_MAX {
        return None;
    }
    Some(upper)
}

pub fn is_full_code(code: &str) -> bool {
    canonicalize(code).is_some()
}

/// Symbol values of a full code, separator removed, capped at full precision
fn code_digits(code: &str) -> Option<Vec<u32>> {
    canonicalize(code)?
        .bytes()
        .filter(|&symbol| symbol != SEPARATOR as u8)
        .take(MAX_DIGIT_COUNT)
        .map(symbol_value)
        .collect()
}

/// Decode a full code into the area it names
pub fn decode_area(code: &str) -> Option<CodeArea> {
    Some(area_of_digits(&code_digits(code)?))
}

fn area_of_digits(digits: &[u32]) -> CodeArea {
    let mut south = -LATITUDE_MAX;
    let mut west = -LONGITUDE_MAX;
    let mut lat_resolution = FIRST_PAIR_RESOLUTION * ENCODING_BASE as f64;
    let mut lng_resolution = FIRST_PAIR_RESOLUTION * ENCODING_BASE as f64;

    let pair_digits = digits.len().min(PAIR_CODE_LENGTH);
    for pair in digits[..pair_digits].chunks(2) {
        lat_resolution /= ENCODING_BASE as f64;
        lng_resolution /= ENCODING_BASE as f64;
        south += pair[0] as f64 * lat_resolution;
        if let Some(&lng_digit) = pair.get(1) {
            west += lng_digit as f64 * lng_resolution;
        }
    }

    for &digit in &digits[pair_digits..] {
        lat_resolution /= GRID_ROWS as f64;
        lng_resolution /= GRID_COLUMNS as f64;
        south += (digit / GRID_COLUMNS) as f64 * lat_resolution;
        west += (digit % GRID_COLUMNS) as f64 * lng_resolution;
    }

    CodeArea {
        south,
        west,
        north: south + lat_resolution,
        east: west + lng_resolution,
        code_length: digits.len(),
    }
}

/// Decode a full code to a point.
///
/// The code is right-padded with the zero symbol to full precision and the
/// center of that final cell is returned, which lies in the south-west
/// corner of the code's own area.
pub fn decode(code: &str) -> Option<(f64, f64)> {
    let mut digits = code_digits(code)?;
    digits.resize(MAX_DIGIT_COUNT, 0);
    let area = area_of_digits(&digits);
    Some((area.center_lat(), area.center_lng()))
}

/// Scale a degree value to the integer grid, rounding away float noise first
fn to_integer_grid(degrees_from_origin: f64, multiplier: i64) -> i64 {
    ((degrees_from_origin * multiplier as f64 * 1e6).round() / 1e6).floor() as i64
}

/// Encode a coordinate as a full code with `code_length` digits (10 to 15)
pub fn encode(lat: f64, lng: f64, code_length: usize) -> Option<String> {
    if !(PAIR_CODE_LENGTH..=MAX_DIGIT_COUNT).contains(&code_length)
        || !lat.is_finite()
        || !lng.is_finite()
    {
        return None;
    }

    let lat = lat.clamp(-LATITUDE_MAX, LATITUDE_MAX);
    let lng = (lng + LONGITUDE_MAX).rem_euclid(2.0 * LONGITUDE_MAX);

    let mut lat_value = to_integer_grid(lat + LATITUDE_MAX, LAT_INTEGER_MULTIPLIER);
    let mut lng_value = to_integer_grid(lng, LNG_INTEGER_MULTIPLIER);
    // The north pole belongs to the cell just below it
    let lat_limit = 2 * LATITUDE_MAX as i64 * LAT_INTEGER_MULTIPLIER;
    if lat_value >= lat_limit {
        lat_value = lat_limit - 1;
    }
    let lng_limit = 2 * LONGITUDE_MAX as i64 * LNG_INTEGER_MULTIPLIER;
    if lng_value >= lng_limit {
        lng_value = 0;
    }

    let mut reversed = Vec::with_capacity(MAX_DIGIT_COUNT);
    for _ in PAIR_CODE_LENGTH..MAX_DIGIT_COUNT {
        let lat_digit = lat_value % GRID_ROWS as i64;
        let lng_digit = lng_value % GRID_COLUMNS as i64;
        reversed.push(CODE_ALPHABET[(lat_digit * GRID_COLUMNS as i64 + lng_digit) as usize]);
        lat_value /= GRID_ROWS as i64;
        lng_value /= GRID_COLUMNS as i64;
    }
    for _ in 0..PAIR_CODE_LENGTH / 2 {
        reversed.push(CODE_ALPHABET[(lng_value % ENCODING_BASE as i64) as usize]);
        reversed.push(CODE_ALPHABET[(lat_value % ENCODING_BASE as i64) as usize]);
        lat_value /= ENCODING_BASE as i64;
        lng_value /= ENCODING_BASE as i64;
    }

    let digits: String = reversed.iter().rev().map(|&symbol| symbol as char).collect();
    let (head, tail) = digits.split_at(SEPARATOR_POSITION);
    Some(format!(
        "{}{}{}",
        head,
        SEPARATOR,
        &tail[..code_length - SEPARATOR_POSITION]
    ))
}

/// Parser for full Open Location Codes
#[derive(Debug, Default, Clone, Copy)]
pub struct PlusCodeParser;

impl FormatParser for PlusCodeParser {
    fn format(&self) -> CoordinateFormat {
        CoordinateFormat::Geocode
    }

    fn parse(&self, input: &str) -> Option<ParsedCoordinate> {
        let (lat, lng) = decode(input)?;
        ParsedCoordinate::checked(lat, lng, CoordinateFormat::Geocode)
    }
}
