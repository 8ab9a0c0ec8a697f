//! Magic Earth links.
//!
//! Deep links use the `magicearth://` scheme; web links use
//! `magicearth.com`. Precedence, highest first:
//!
//! 1. `lat=`/`lon=` parameters
//! 2. `ll=lat,lon`
//! 3. `q=` / `name=` text

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{coordinate, lat_lon_pair, zoom_param};
use crate::types::{ParseUriResult, UriInput};

pub struct MagicEarth;

fn accepts(uri: &Uri) -> bool {
    match uri.scheme() {
        Some("magicearth") => true,
        None | Some("http" | "https") => uri.host().is_some_and(|host| {
            host.eq_ignore_ascii_case("magicearth.com")
                || host.eq_ignore_ascii_case("www.magicearth.com")
        }),
        _ => false,
    }
}

impl UriInput for MagicEarth {
    fn id(&self) -> &'static str {
        "magic_earth"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(r"magicearth://[^\s]+|(?:https?://)?(?:www\.)?magicearth\.com/[^\s]*")
            .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !accepts(uri) {
            return ParseUriResult::Failed;
        }

        let zoom = zoom_param(uri, &["zoom", "z"]);

        let explicit = match (
            uri.query_param("lat").and_then(coordinate),
            uri.query_param("lon").and_then(coordinate),
        ) {
            (Some(lat), Some(lon)) => Some((lat.to_owned(), lon.to_owned())),
            _ => None,
        };
        if let Some((lat, lon)) = explicit {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.q = uri
                .query_param("name")
                .filter(|n| !n.is_empty())
                .map(str::to_owned);
            pos.z = zoom;
            return ParseUriResult::Succeeded(pos);
        }

        if let Some((lat, lon)) = uri.query_param("ll").and_then(lat_lon_pair) {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.z = zoom;
            return ParseUriResult::Succeeded(pos);
        }

        for param in ["q", "name"] {
            if let Some(value) = uri.query_param(param).filter(|v| !v.is_empty()) {
                let mut pos = match lat_lon_pair(value) {
                    Some((lat, lon)) => Position::from_lat_lon(lat, lon),
                    None => Position::from_query(value),
                };
                pos.z = zoom;
                return ParseUriResult::Succeeded(pos);
            }
        }

        ParseUriResult::Failed
    }
}
