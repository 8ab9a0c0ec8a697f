//! Organic Maps / CoMaps share links.
//!
//! Share links carry an opaque ge0 blob plus a human-readable name segment
//! (`omaps.app/<code>/<Name>`); `om://` and `ge0://` deep links use the
//! same shape with the code in the authority position. Explicit `ll=`
//! parameters win when present; otherwise the name segment becomes the
//! search query. A bare code with no name has nothing extractable and
//! fails.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lat_lon_pair, zoom_param};
use crate::types::{ParseUriResult, UriInput};

pub struct OrganicMaps;

const HOSTS: [&str; 4] = ["omaps.app", "comaps.at", "ge0.me", "www.omaps.app"];

fn is_app_scheme(uri: &Uri) -> bool {
    matches!(uri.scheme(), Some("om" | "ge0" | "comaps"))
}

fn host_is_organic(uri: &Uri) -> bool {
    uri.host()
        .is_some_and(|host| HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)))
}

fn name_from_path(path: &str, skip_code_segment: bool) -> Option<String> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    if skip_code_segment {
        segments.next()?;
    }
    let name = segments.next()?.replace('_', " ");
    if name.trim().is_empty() {
        None
    } else {
        Some(name.trim().to_owned())
    }
}

impl UriInput for OrganicMaps {
    fn id(&self) -> &'static str {
        "organic_maps"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(
            r"(?:https?://)?(?:www\.)?(?:omaps\.app|comaps\.at|ge0\.me)/[^\s]+|(?:om|ge0|comaps)://[^\s]+",
        )
        .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        let app_scheme = is_app_scheme(uri);
        let web_host = matches!(uri.scheme(), None | Some("http" | "https")) && host_is_organic(uri);
        if !app_scheme && !web_host {
            return ParseUriResult::Failed;
        }

        if let Some((lat, lon)) = uri.query_param("ll").and_then(lat_lon_pair) {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.q = uri
                .query_param("n")
                .filter(|n| !n.is_empty())
                .map(str::to_owned);
            pos.z = zoom_param(uri, &["z", "zoom"]);
            return ParseUriResult::Succeeded(pos);
        }

        // Web links: /<code>/<Name>. App links: the code already sits in the
        // authority, so the whole path is the name.
        if let Some(name) = name_from_path(uri.path(), !app_scheme) {
            return ParseUriResult::Succeeded(Position::from_query(name));
        }

        ParseUriResult::Failed
    }
}
