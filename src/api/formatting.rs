//! Human-readable labels for distances, coordinates and directions

use crate::algorithms::geodesy::normalize_degrees;
use crate::core::Coordinate;

pub use crate::processing::dms::format_dms;

const CARDINALS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Distance label: whole meters below 1 km, then kilometers with up to two
/// decimals below 10 km and whole kilometers above.
pub fn format_distance(meters: f64) -> String {
    if !meters.is_finite() || meters < 0.0 {
        return "-".to_string();
    }
    if meters.round() < 1_000.0 {
        return format!("{} m", meters.round() as u64);
    }

    let km = meters / 1_000.0;
    if km >= 10.0 {
        return format!("{} km", km.round() as u64);
    }
    let text = format!("{:.2}", km);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} km", text)
}

/// Decimal coordinate with six places, the precision of a typed destination
pub fn format_coordinate(coordinate: &Coordinate) -> String {
    format!("{:.6}, {:.6}", coordinate.lat, coordinate.lng)
}

/// Nearest of the eight compass points
pub fn cardinal(degrees: f64) -> &'static str {
    let sector = ((normalize_degrees(degrees) + 22.5) / 45.0) as usize % CARDINALS.len();
    CARDINALS[sector]
}
