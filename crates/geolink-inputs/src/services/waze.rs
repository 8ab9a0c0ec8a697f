//! Waze links.
//!
//! Extraction precedence, highest first:
//!
//! 1. `ll=lat,lon` / `to=ll.lat,lon` / `latlng=lat,lon`
//! 2. `to=place.<id>`; place-only, no coordinates; the id becomes the query
//! 3. free-text `q=`
//!
//! `waze.com/ul/h<geohash>` deep links embed the location as a geohash and
//! decode locally without any network hop.

use geolink_core::codec::decode_geo_hash;
use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lat_lon_pair, zoom_param};
use crate::types::{ParseUriResult, UriInput};

pub struct Waze;

fn host_is_waze(uri: &Uri) -> bool {
    const HOSTS: [&str; 3] = ["waze.com", "www.waze.com", "ul.waze.com"];
    uri.host()
        .is_some_and(|host| HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)))
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https" | "waze"))
}

fn geohash_from_path(path: &str) -> Option<Position> {
    let code = path.strip_prefix("/ul/h")?.split('/').next()?;
    if code.is_empty() {
        return None;
    }
    let decoded = decode_geo_hash(code);
    if decoded == geolink_core::codec::DecodedPoint::ORIGIN {
        return None;
    }
    let mut pos = Position::from_lat_lon(
        format!("{:.6}", decoded.lat),
        format!("{:.6}", decoded.lon),
    );
    pos.z = Some(decoded.zoom.to_string());
    Some(pos)
}

impl UriInput for Waze {
    fn id(&self) -> &'static str {
        "waze"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(r"(?:https?://)?(?:www\.|ul\.)?waze\.com(?:/[^\s]*)?(?:\?[^\s]*)?")
            .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || !host_is_waze(uri) {
            return ParseUriResult::Failed;
        }

        if let Some(pos) = geohash_from_path(uri.path()) {
            return ParseUriResult::Succeeded(pos);
        }

        let zoom = zoom_param(uri, &["z", "zoom"]);

        let coordinate_sources = [
            uri.query_param("ll"),
            uri.query_param("to")
                .and_then(|to| to.strip_prefix("ll.")),
            uri.query_param("latlng"),
        ];
        for source in coordinate_sources.into_iter().flatten() {
            if let Some((lat, lon)) = lat_lon_pair(source) {
                let mut pos = Position::from_lat_lon(lat, lon);
                pos.z = zoom;
                return ParseUriResult::Succeeded(pos);
            }
        }

        if let Some(place) = uri
            .query_param("to")
            .and_then(|to| to.strip_prefix("place."))
            .filter(|p| !p.is_empty())
        {
            return ParseUriResult::Succeeded(Position::from_query(place));
        }

        if let Some(q) = uri.query_param("q").filter(|q| !q.is_empty()) {
            let mut pos = match lat_lon_pair(q) {
                Some((lat, lon)) => Position::from_lat_lon(lat, lon),
                None => Position::from_query(q),
            };
            pos.z = zoom;
            return ParseUriResult::Succeeded(pos);
        }

        ParseUriResult::Failed
    }
}
