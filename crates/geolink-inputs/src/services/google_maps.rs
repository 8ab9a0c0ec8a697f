//! Google Maps links.
//!
//! Extraction precedence, highest first:
//!
//! 1. path-embedded camera position `@lat,lon,NNz`
//! 2. `data=` blobs carrying `!3d<lat>!4d<lon>`
//! 3. `q` / `query` / `destination` parameters (coordinate pair or text)
//! 4. `/maps/place/<name>` and `/maps/search/<term>` path segments
//!
//! A place link without embedded coordinates only resolves through the
//! page HTML (or a full web render, when the static page is a JS shell),
//! so those matches advertise the HTML capability. `maps.app.goo.gl` and
//! `goo.gl/maps` short links resolve via a `HEAD` redirect probe.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lat_lon_pair, zoom};
use crate::types::{ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod, UriInput};

pub struct GoogleMaps;

fn host_is_google_maps(uri: &Uri) -> bool {
    let Some(host) = uri.host() else { return false };
    let host = host.to_ascii_lowercase();
    if host == "maps.app.goo.gl" || host == "goo.gl" {
        return true;
    }
    let re = Regex::new(r"^(?:www\.)?(?:maps\.)?google\.[a-z]{2,3}(?:\.[a-z]{2})?$")
        .expect("valid regex");
    if !re.is_match(&host) {
        return false;
    }
    // Plain google.<tld> only counts with a /maps path; maps.google.<tld>
    // takes anything.
    host.starts_with("maps.") || uri.path().starts_with("/maps")
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https"))
}

fn camera_from_path(path: &str) -> Option<Position> {
    let re = Regex::new(r"@(-?\d{1,3}(?:\.\d+)?),(-?\d{1,3}(?:\.\d+)?)(?:,([^,/]+)z)?")
        .expect("valid regex");
    let cap = re.captures(path)?;
    let mut pos = Position::from_lat_lon(&cap[1], &cap[2]);
    if let Some(z) = cap.get(3).and_then(|m| zoom(m.as_str())) {
        pos.z = Some(z);
    }
    Some(pos)
}

fn data_blob_coordinates(uri: &Uri) -> Option<Position> {
    let re = Regex::new(r"!3d(-?\d{1,3}(?:\.\d+)?)!4d(-?\d{1,3}(?:\.\d+)?)").expect("valid regex");
    let from = |s: &str| {
        re.captures(s)
            .map(|cap| Position::from_lat_lon(&cap[1], &cap[2]))
    };
    from(uri.path()).or_else(|| uri.query_param("data").and_then(from))
}

fn place_name(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/maps/place/")?;
    let name = rest.split('/').next()?.replace('+', " ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn search_term(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/maps/search/")?;
    let term = rest.split('/').next()?.replace('+', " ");
    if term.is_empty() {
        None
    } else {
        Some(term)
    }
}

fn directions_route(path: &str) -> Option<Position> {
    let rest = path.strip_prefix("/maps/dir/")?;
    let mut position = Position::default();
    for segment in rest.split('/').filter(|s| !s.is_empty() && !s.starts_with('@')) {
        if let Some((lat, lon)) = lat_lon_pair(segment) {
            position.points.push(geolink_core::position::Point::new(lat, lon));
        } else if !segment.starts_with("data=") {
            position.q = Some(segment.replace('+', " "));
        }
    }
    if position.is_successful() {
        Some(position)
    } else {
        None
    }
}

impl UriInput for GoogleMaps {
    fn id(&self) -> &'static str {
        "google_maps"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(
            r"(?:https?://)?(?:(?:www\.)?(?:maps\.)?google\.[a-z]{2,3}(?:\.[a-z]{2})?/maps[^\s]*|maps\.google\.[a-z]{2,3}(?:\.[a-z]{2})?(?:/[^\s]*)?|maps\.app\.goo\.gl/[^\s]*|goo\.gl/maps/[^\s]*)",
        )
        .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || !host_is_google_maps(uri) {
            return ParseUriResult::Failed;
        }

        if let Some(mut pos) = camera_from_path(uri.path()) {
            // A place path alongside an explicit camera position keeps the
            // camera; data blobs refine it when they pin the POI itself.
            if let Some(pin) = data_blob_coordinates(uri) {
                pos.lat = pin.lat;
                pos.lon = pin.lon;
            }
            return ParseUriResult::Succeeded(pos);
        }

        if let Some(pos) = data_blob_coordinates(uri) {
            return ParseUriResult::Succeeded(pos);
        }

        for param in ["q", "query", "destination"] {
            if let Some(value) = uri.query_param(param).filter(|v| !v.is_empty()) {
                let mut pos = match lat_lon_pair(value) {
                    Some((lat, lon)) => Position::from_lat_lon(lat, lon),
                    None => Position::from_query(value),
                };
                pos.z = uri.query_param("z").and_then(|z| zoom(z));
                return ParseUriResult::Succeeded(pos);
            }
        }

        if let Some(name) = place_name(uri.path()) {
            let html_url = uri
                .to_absolute_url("https", "www.google.com", "/maps/")
                .to_string();
            return ParseUriResult::SucceededAndSupportsHtmlParsing(
                Position::from_query(name),
                html_url,
            );
        }

        if let Some(term) = search_term(uri.path()) {
            return ParseUriResult::Succeeded(Position::from_query(term));
        }

        if let Some(route) = directions_route(uri.path()) {
            return ParseUriResult::Succeeded(route);
        }

        ParseUriResult::Failed
    }

    fn short_uri(&self, uri: &Uri) -> Option<ShortUri> {
        let host = uri.host()?.to_ascii_lowercase();
        let segment = uri.path().trim_start_matches('/');

        let is_short = match host.as_str() {
            "maps.app.goo.gl" => !segment.is_empty(),
            "goo.gl" => segment
                .strip_prefix("maps/")
                .is_some_and(|rest| !rest.is_empty()),
            _ => false,
        };
        if !is_short {
            return None;
        }

        // Normalize: force https and drop tracking query parameters.
        Some(ShortUri {
            url: format!("https://{host}{}", uri.path()),
            method: ShortUriMethod::Head,
        })
    }

    fn supports_html_parsing(&self) -> bool {
        true
    }

    fn supports_web_parsing(&self) -> bool {
        true
    }

    fn parse_html(&self, html: &str, points_from_uri: &Position) -> ParseHtmlResult {
        let patterns = [
            r"!3d(-?\d{1,3}\.\d+)!4d(-?\d{1,3}\.\d+)",
            r"@(-?\d{1,3}\.\d+),(-?\d{1,3}\.\d+)",
            r"\[null,null,(-?\d{1,3}\.\d+),(-?\d{1,3}\.\d+)\]",
        ];
        for pattern in &patterns {
            let re = Regex::new(pattern).expect("valid regex");
            if let Some(cap) = re.captures(html) {
                let mut pos = points_from_uri.clone();
                pos.lat = Some(cap[1].to_owned());
                pos.lon = Some(cap[2].to_owned());
                return ParseHtmlResult::Succeeded(pos);
            }
        }

        let refresh = Regex::new(
            r#"<meta[^>]+http-equiv=["']refresh["'][^>]+content=["'][^"']*url=([^"']+)["']"#,
        )
        .expect("valid regex");
        if let Some(cap) = refresh.captures(html) {
            return ParseHtmlResult::RequiresRedirect(cap[1].to_owned());
        }

        if html.contains("enable JavaScript") {
            let canonical = Regex::new(
                r#"<link[^>]+rel=["']canonical["'][^>]+href=["']([^"']+)["']"#,
            )
            .expect("valid regex");
            if let Some(cap) = canonical.captures(html) {
                return ParseHtmlResult::RequiresWebParsing(cap[1].to_owned());
            }
        }

        ParseHtmlResult::Failed
    }
}
