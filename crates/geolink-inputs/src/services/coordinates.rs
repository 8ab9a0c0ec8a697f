//! Raw coordinate text.
//!
//! Catches coordinates pasted without any URL around them: plain decimal
//! pairs (`44.4490541, 26.0888398`) and cardinal-decorated degrees
//! (`N 50.894967 E 4.341626`, `50.894967° N, 4.341626° E`). Registered
//! last; every real service URL must win over this catch-all.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lat_lon_pair, opaque_part};
use crate::types::{ParseUriResult, UriInput};

pub struct Coordinates;

const DECIMAL_PAIR: &str = r"-?\d{1,3}\.\d+\s*,\s*-?\d{1,3}\.\d+";
const CARDINAL_PREFIX: &str =
    r"[NSns]\s?\d{1,3}(?:\.\d+)?°?\s*,?\s*[EWew]\s?\d{1,3}(?:\.\d+)?°?";
const CARDINAL_SUFFIX: &str =
    r"\d{1,3}(?:\.\d+)?°?\s?[NSns]\s*,?\s*\d{1,3}(?:\.\d+)?°?\s?[EWew]";

fn signed(value: &str, hemisphere: char) -> String {
    if matches!(hemisphere.to_ascii_uppercase(), 'S' | 'W') {
        format!("-{value}")
    } else {
        value.to_owned()
    }
}

fn parse_cardinal(text: &str) -> Option<(String, String)> {
    let prefix = Regex::new(
        r"(?i)([NS])\s?(\d{1,3}(?:\.\d+)?)°?\s*,?\s*([EW])\s?(\d{1,3}(?:\.\d+)?)°?",
    )
    .expect("valid regex");
    if let Some(cap) = prefix.captures(text) {
        let lat_h = cap[1].chars().next()?;
        let lon_h = cap[3].chars().next()?;
        return Some((signed(&cap[2], lat_h), signed(&cap[4], lon_h)));
    }

    let suffix = Regex::new(
        r"(?i)(\d{1,3}(?:\.\d+)?)°?\s?([NS])\s*,?\s*(\d{1,3}(?:\.\d+)?)°?\s?([EW])",
    )
    .expect("valid regex");
    if let Some(cap) = suffix.captures(text) {
        let lat_h = cap[2].chars().next()?;
        let lon_h = cap[4].chars().next()?;
        return Some((signed(&cap[1], lat_h), signed(&cap[3], lon_h)));
    }

    None
}

impl UriInput for Coordinates {
    fn id(&self) -> &'static str {
        "coordinates"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(&format!(
            "{DECIMAL_PAIR}|{CARDINAL_PREFIX}|{CARDINAL_SUFFIX}"
        ))
        .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if uri.scheme().is_some() {
            return ParseUriResult::Failed;
        }
        let text = opaque_part(uri);

        if let Some((lat, lon)) = lat_lon_pair(text).or_else(|| parse_cardinal(text)) {
            return ParseUriResult::Succeeded(Position::from_lat_lon(lat, lon));
        }
        ParseUriResult::Failed
    }
}
