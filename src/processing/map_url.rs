//! Coordinates embedded in links copied from map services
//!
//! Two shapes are recognized, tried in this order:
//! - `.../@37.4224,-122.0841,17z` path segment
//! - `...?q=37.4224,-122.0841` query parameter
//!
//! Shortened share links only redirect to one of these shapes and cannot be
//! expanded offline, so they are treated like any other unsupported text.

use crate::processing::parser::{split_decimal_pair, CoordinateFormat, FormatParser, ParsedCoordinate};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Redirect hosts whose links carry no coordinates
const SHORTENED_HOSTS: [&str; 4] = ["goo.gl", "maps.app.goo.gl", "g.co", "g.page"];

/// Exact hosts outside the Google family
const OTHER_MAP_HOSTS: [&str; 1] = ["maps.apple.com"];

fn google_host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:www\.|maps\.)?google\.[a-z]{2,3}(?:\.[a-z]{2})?$").unwrap()
    })
}

fn at_segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"@([+-]?\d+(?:\.\d+)?),([+-]?\d+(?:\.\d+)?)").unwrap()
    })
}

fn is_map_host(host: &str) -> bool {
    google_host_pattern().is_match(host) || OTHER_MAP_HOSTS.contains(&host)
}

fn is_shortened_host(host: &str) -> bool {
    SHORTENED_HOSTS.contains(&host)
}

/// Parse text as an http(s) URL, accepting links pasted without a scheme
fn parse_link(input: &str) -> Option<Url> {
    let candidate = if input.contains("://") {
        input.to_string()
    } else if input.starts_with("www.") || input.starts_with("maps.") || input.starts_with("google.") {
        format!("https://{input}")
    } else {
        return None;
    };

    let url = Url::parse(&candidate).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

fn from_at_segment(url: &Url) -> Option<(f64, f64)> {
    let captures = at_segment_pattern().captures(url.path())?;
    let lat = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let lng = captures.get(2)?.as_str().parse::<f64>().ok()?;
    Some((lat, lng))
}

fn from_query(url: &Url) -> Option<(f64, f64)> {
    url.query_pairs()
        .find(|(key, _)| key == "q")
        .and_then(|(_, value)| split_decimal_pair(&value))
}

/// Parser for links from a fixed family of map services
#[derive(Debug, Default, Clone, Copy)]
pub struct MapUrlParser;

impl FormatParser for MapUrlParser {
    fn format(&self) -> CoordinateFormat {
        CoordinateFormat::MapUrl
    }

    fn parse(&self, input: &str) -> Option<ParsedCoordinate> {
        let url = parse_link(input)?;
        let host = url.host_str()?.to_ascii_lowercase();

        if is_shortened_host(&host) {
            tracing::debug!(host = %host, "shortened map link cannot be resolved offline");
            return None;
        }
        if !is_map_host(&host) {
            return None;
        }

        let (lat, lng) = from_at_segment(&url).or_else(|| from_query(&url))?;
        ParsedCoordinate::checked(lat, lng, CoordinateFormat::MapUrl)
    }
}
