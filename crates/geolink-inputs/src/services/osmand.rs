//! OsmAnd share links.
//!
//! Extraction precedence, highest first:
//!
//! 1. `pin=lat,lon` parameter on `/map`
//! 2. `lat=`/`lon=` parameters on `/go`
//! 3. `#zoom/lat/lon` fragment

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{coordinate, lat_lon_pair, zoom, zoom_param};
use crate::types::{ParseUriResult, UriInput};

pub struct OsmAnd;

fn host_is_osmand(uri: &Uri) -> bool {
    const HOSTS: [&str; 2] = ["osmand.net", "www.osmand.net"];
    uri.host()
        .is_some_and(|host| HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)))
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https"))
}

/// `#15/52.52/13.405` map fragments.
fn parse_fragment(fragment: &str) -> Option<Position> {
    let re = Regex::new(r"^([^/]+)/(-?\d{1,3}(?:\.\d+)?)/(-?\d{1,3}(?:\.\d+)?)")
        .expect("valid regex");
    let cap = re.captures(fragment)?;
    let lat = coordinate(&cap[2])?.to_owned();
    let lon = coordinate(&cap[3])?.to_owned();
    let mut pos = Position::from_lat_lon(lat, lon);
    pos.z = zoom(&cap[1]);
    Some(pos)
}

impl UriInput for OsmAnd {
    fn id(&self) -> &'static str {
        "osmand"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(r"(?:https?://)?(?:www\.)?osmand\.net/(?:map|go)[^\s]*").expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || !host_is_osmand(uri) {
            return ParseUriResult::Failed;
        }

        if let Some((lat, lon)) = uri.query_param("pin").and_then(lat_lon_pair) {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.z = zoom_param(uri, &["z"])
                .or_else(|| uri.fragment().and_then(parse_fragment).and_then(|p| p.z));
            return ParseUriResult::Succeeded(pos);
        }

        let go_pair = match (
            uri.query_param("lat").and_then(coordinate),
            uri.query_param("lon").and_then(coordinate),
        ) {
            (Some(lat), Some(lon)) => Some((lat.to_owned(), lon.to_owned())),
            _ => None,
        };
        if let Some((lat, lon)) = go_pair {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.z = zoom_param(uri, &["z"]);
            return ParseUriResult::Succeeded(pos);
        }

        if let Some(pos) = uri.fragment().and_then(parse_fragment) {
            return ParseUriResult::Succeeded(pos);
        }

        ParseUriResult::Failed
    }
}
