//! Mapy.com (formerly Mapy.cz) links.
//!
//! Coordinates ride in `x`/`y` parameters (x = longitude) or in a
//! `source=coor&id=lon,lat` pair for pinned places; both put longitude
//! first. Precedence, highest first:
//!
//! 1. `source=coor&id=lon,lat`
//! 2. `x=`/`y=` map center with `z=`
//! 3. `q`/`query` free text
//!
//! `mapy.cz/s/<code>` and `mapy.com/s/<code>` short links answer a plain
//! `GET` with the long form in the redirect or the page's canonical link.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{coordinate, lon_lat_pair, zoom_param};
use crate::types::{ParseUriResult, ShortUri, ShortUriMethod, UriInput};

pub struct Mapy;

fn host_is_mapy(uri: &Uri) -> Option<String> {
    let host = uri.host()?.to_ascii_lowercase();
    let re = Regex::new(r"^(?:[a-z]{2}\.|www\.)?mapy\.(?:cz|com)$").expect("valid regex");
    re.is_match(&host).then_some(host)
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https"))
}

impl UriInput for Mapy {
    fn id(&self) -> &'static str {
        "mapy"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(r"(?:https?://)?(?:[a-z]{2}\.|www\.)?mapy\.(?:cz|com)(?:/[^\s]*)?(?:\?[^\s]*)?")
            .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || host_is_mapy(uri).is_none() {
            return ParseUriResult::Failed;
        }

        let zoom = zoom_param(uri, &["z"]);

        if uri.query_param("source") == Some("coor") {
            if let Some((lat, lon)) = uri.query_param("id").and_then(lon_lat_pair) {
                let mut pos = Position::from_lat_lon(lat, lon);
                pos.z = zoom;
                return ParseUriResult::Succeeded(pos);
            }
        }

        let center = match (
            uri.query_param("y").and_then(coordinate),
            uri.query_param("x").and_then(coordinate),
        ) {
            (Some(lat), Some(lon)) => Some((lat.to_owned(), lon.to_owned())),
            _ => None,
        };
        if let Some((lat, lon)) = center {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.z = zoom;
            return ParseUriResult::Succeeded(pos);
        }

        for param in ["q", "query"] {
            if let Some(q) = uri.query_param(param).filter(|q| !q.is_empty()) {
                let mut pos = Position::from_query(q);
                pos.z = zoom;
                return ParseUriResult::Succeeded(pos);
            }
        }

        ParseUriResult::Failed
    }

    fn short_uri(&self, uri: &Uri) -> Option<ShortUri> {
        let host = host_is_mapy(uri)?;
        let code = uri.path().strip_prefix("/s/")?;
        if code.is_empty() {
            return None;
        }
        Some(ShortUri {
            url: format!("https://{host}{}", uri.path()),
            method: ShortUriMethod::Get,
        })
    }
}
