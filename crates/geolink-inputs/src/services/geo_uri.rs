//! `geo:` URI handler.
//!
//! The identity conversion: a `geo:` URI is already the normalized form,
//! but it still flows through extraction so that `geo:0,0?q=...` search
//! forms and label queries normalize the same way as every other service.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lat_lon_pair, opaque_part, zoom_param};
use crate::types::{ParseUriResult, UriInput};

pub struct GeoUri;

fn is_zero_pair(lat: &str, lon: &str) -> bool {
    let zero = |s: &str| s.parse::<f64>().is_ok_and(|v| v.abs() < f64::EPSILON);
    zero(lat) && zero(lon)
}

/// `q` may itself be `lat,lon` or `lat,lon(Label)`.
fn query_as_coordinates(q: &str) -> Option<(String, String, Option<String>)> {
    let (coords, label) = match q.split_once('(') {
        Some((coords, rest)) => (coords.trim(), rest.strip_suffix(')').map(str::trim)),
        None => (q.trim(), None),
    };
    let (lat, lon) = lat_lon_pair(coords)?;
    Some((lat, lon, label.filter(|l| !l.is_empty()).map(str::to_owned)))
}

impl UriInput for GeoUri {
    fn id(&self) -> &'static str {
        "geo"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(r"geo:[^\s]+").expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if uri.scheme() != Some("geo") {
            return ParseUriResult::Failed;
        }

        let mut position = Position::default();
        if let Some((lat, lon)) = lat_lon_pair(opaque_part(uri)) {
            if !is_zero_pair(&lat, &lon) {
                position.lat = Some(lat);
                position.lon = Some(lon);
            }
        }

        if let Some(q) = uri.query_param("q").filter(|q| !q.is_empty()) {
            if position.lat.is_some() {
                position.q = Some(q.to_owned());
            } else if let Some((lat, lon, label)) = query_as_coordinates(q) {
                position.lat = Some(lat);
                position.lon = Some(lon);
                position.q = label;
            } else {
                position.q = Some(q.to_owned());
            }
        }

        position.z = zoom_param(uri, &["z"]);

        if position.is_successful() {
            ParseUriResult::Succeeded(position)
        } else {
            ParseUriResult::Failed
        }
    }
}
