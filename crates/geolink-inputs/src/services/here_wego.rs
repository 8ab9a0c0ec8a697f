//! HERE WeGo links.
//!
//! Extraction precedence, highest first:
//!
//! 1. `/l/lat,lon(,zoom)` location paths
//! 2. `map=lat,lon,zoom` viewport parameter
//! 3. `/p/<token>` place pages; no coordinates in the URL; the page's
//!    embedded JSON carries them, so these advertise HTML parsing
//!
//! `her.is/<code>` short links resolve via a `HEAD` probe.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lat_lon_pair, zoom};
use crate::types::{ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod, UriInput};

pub struct HereWeGo;

fn host_kind(uri: &Uri) -> Option<&'static str> {
    let host = uri.host()?.to_ascii_lowercase();
    match host.as_str() {
        "wego.here.com" | "share.here.com" => Some("long"),
        "her.is" => Some("short"),
        _ => None,
    }
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https"))
}

fn json_number_or_string(value: Option<&serde_json::Value>) -> Option<String> {
    let value = value?;
    value
        .as_f64()
        .map(|n| n.to_string())
        .or_else(|| value.as_str().map(str::to_owned))
}

/// schema.org JSON-LD blocks with a `geo` object.
fn jsonld_coordinates(html: &str) -> Option<(String, String)> {
    let re = Regex::new(
        r#"(?s)<script[^>]+type=["']application/ld\+json["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid regex");
    for cap in re.captures_iter(html) {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(cap[1].trim()) else {
            continue;
        };
        let Some(geo) = value.get("geo") else {
            continue;
        };
        let lat = json_number_or_string(geo.get("latitude"));
        let lon = json_number_or_string(geo.get("longitude"));
        if let (Some(lat), Some(lon)) = (lat, lon) {
            return Some((lat, lon));
        }
    }
    None
}

/// `lat,lon` or `lat,lon,zoom[,...]`.
fn coords_with_zoom(raw: &str) -> Option<Position> {
    let (lat, lon) = lat_lon_pair(raw)?;
    let mut pos = Position::from_lat_lon(lat, lon);
    pos.z = raw.split(',').nth(2).and_then(zoom);
    Some(pos)
}

impl UriInput for HereWeGo {
    fn id(&self) -> &'static str {
        "here_wego"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(
            r"(?:https?://)?(?:wego\.here\.com|share\.here\.com|her\.is)(?:/[^\s]*)?(?:\?[^\s]*)?",
        )
        .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || host_kind(uri) != Some("long") {
            return ParseUriResult::Failed;
        }

        if let Some(rest) = uri.path().strip_prefix("/l/") {
            if let Some(pos) = rest.split('/').next().and_then(coords_with_zoom) {
                return ParseUriResult::Succeeded(pos);
            }
        }

        if let Some(pos) = uri.query_param("map").and_then(coords_with_zoom) {
            return ParseUriResult::Succeeded(pos);
        }

        if let Some(token) = uri.path().strip_prefix("/p/").filter(|t| !t.is_empty()) {
            let label = token.split('/').next().unwrap_or(token);
            let html_url = uri
                .to_absolute_url("https", "share.here.com", "/")
                .to_string();
            return ParseUriResult::SucceededAndSupportsHtmlParsing(
                Position::from_query(label),
                html_url,
            );
        }

        ParseUriResult::Failed
    }

    fn short_uri(&self, uri: &Uri) -> Option<ShortUri> {
        if host_kind(uri) != Some("short") {
            return None;
        }
        let code = uri.path().trim_start_matches('/');
        if code.is_empty() {
            return None;
        }
        Some(ShortUri {
            url: format!("https://her.is{}", uri.path()),
            method: ShortUriMethod::Head,
        })
    }

    fn supports_html_parsing(&self) -> bool {
        true
    }

    fn parse_html(&self, html: &str, points_from_uri: &Position) -> ParseHtmlResult {
        if let Some((lat, lon)) = jsonld_coordinates(html) {
            let mut pos = points_from_uri.clone();
            pos.lat = Some(lat);
            pos.lon = Some(lon);
            return ParseHtmlResult::Succeeded(pos);
        }

        // Looser fallback: any embedded JSON with adjacent latitude/longitude.
        let re = Regex::new(
            r#""latitude"\s*:\s*"?(-?\d{1,3}(?:\.\d+)?)"?\s*,\s*"longitude"\s*:\s*"?(-?\d{1,3}(?:\.\d+)?)"?"#,
        )
        .expect("valid regex");
        if let Some(cap) = re.captures(html) {
            let mut pos = points_from_uri.clone();
            pos.lat = Some(cap[1].to_owned());
            pos.lon = Some(cap[2].to_owned());
            return ParseHtmlResult::Succeeded(pos);
        }
        ParseHtmlResult::Failed
    }
}
