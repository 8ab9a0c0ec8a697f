//! Apple Maps links.
//!
//! Extraction precedence, highest first:
//!
//! 1. `ll=lat,lon` (explicit pin), `coordinate=lat,lon` (new-style place
//!    links)
//! 2. `sll=lat,lon` search center, which *bundles* its `q`/`z` companions
//! 3. `center=lat,lon`, with `span=dlat,dlon` approximating a zoom level
//! 4. `address=` / `name=`
//! 5. bare `q=` (coordinate pair or text)
//!
//! `maps.apple.com/p/<token>` share links are shortened: a `GET` probe
//! reveals the long form via redirect or canonical link.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lat_lon_pair, zoom_param};
use crate::types::{ParseUriResult, ShortUri, ShortUriMethod, UriInput};

pub struct AppleMaps;

const HOSTS: [&str; 4] = [
    "maps.apple.com",
    "maps.apple",
    "beta.maps.apple.com",
    "guides.apple.com",
];

fn host_is_apple_maps(uri: &Uri) -> bool {
    uri.host()
        .is_some_and(|host| HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)))
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https" | "maps"))
}

/// Approximate a zoom level from a `span=dlat,dlon` viewport: the span
/// halves with every zoom step.
fn span_zoom(span: &str) -> Option<String> {
    let first = span.split(',').next()?.trim();
    let degrees: f64 = first.parse().ok()?;
    if !(degrees.is_finite() && degrees > 0.0) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let level = (360.0 / degrees).log2().round().clamp(1.0, 21.0) as i64;
    Some(level.to_string())
}

impl UriInput for AppleMaps {
    fn id(&self) -> &'static str {
        "apple_maps"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(
            r"(?:https?://|maps://)?(?:beta\.)?(?:maps\.apple(?:\.com)?|guides\.apple\.com)(?:/[^\s]*)?(?:\?[^\s]*)?",
        )
        .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || !host_is_apple_maps(uri) {
            return ParseUriResult::Failed;
        }

        let zoom = zoom_param(uri, &["z"]);

        for param in ["ll", "coordinate"] {
            if let Some((lat, lon)) = uri.query_param(param).and_then(lat_lon_pair) {
                let mut pos = Position::from_lat_lon(lat, lon);
                pos.z = zoom;
                return ParseUriResult::Succeeded(pos);
            }
        }

        if let Some((lat, lon)) = uri.query_param("sll").and_then(lat_lon_pair) {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.q = uri
                .query_param("q")
                .filter(|q| !q.is_empty())
                .map(str::to_owned);
            pos.z = zoom;
            return ParseUriResult::Succeeded(pos);
        }

        if let Some((lat, lon)) = uri.query_param("center").and_then(lat_lon_pair) {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.z = zoom.or_else(|| uri.query_param("span").and_then(span_zoom));
            return ParseUriResult::Succeeded(pos);
        }

        for param in ["address", "name"] {
            if let Some(value) = uri.query_param(param).filter(|v| !v.is_empty()) {
                let mut pos = Position::from_query(value);
                pos.z = zoom;
                return ParseUriResult::Succeeded(pos);
            }
        }

        if let Some(value) = uri.query_param("q").filter(|v| !v.is_empty()) {
            let mut pos = match lat_lon_pair(value) {
                Some((lat, lon)) => Position::from_lat_lon(lat, lon),
                None => Position::from_query(value),
            };
            pos.z = zoom;
            return ParseUriResult::Succeeded(pos);
        }

        ParseUriResult::Failed
    }

    fn short_uri(&self, uri: &Uri) -> Option<ShortUri> {
        if !host_is_apple_maps(uri) {
            return None;
        }
        let token = uri.path().strip_prefix("/p/")?;
        if token.is_empty() {
            return None;
        }
        Some(ShortUri {
            url: format!("https://maps.apple.com{}", uri.path()),
            method: ShortUriMethod::Get,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParseUriResult {
        AppleMaps.parse_uri(&Uri::parse(raw))
    }

    #[test]
    fn ll_parameter() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/?ll=50.894967,4.341626")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("50.894967"));
        assert_eq!(pos.lon.as_deref(), Some("4.341626"));
    }

    #[test]
    fn ll_beats_sll_and_q() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/?ll=1.5,2.5&sll=9.9,8.8&q=Atomium")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("1.5"));
        assert_eq!(pos.q, None, "ll wins alone; q belongs to the sll tier");
    }

    #[test]
    fn sll_bundles_query_and_zoom() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/?sll=50.894967,4.341626&q=Atomium&z=16")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("50.894967"));
        assert_eq!(pos.q.as_deref(), Some("Atomium"));
        assert_eq!(pos.z.as_deref(), Some("16"));
    }

    #[test]
    fn coordinate_parameter_from_place_links() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/place?coordinate=48.8583701,2.2944813")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("48.8583701"));
    }

    #[test]
    fn center_with_span_derives_zoom() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/?center=52.52,13.405&span=0.01,0.01")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("52.52"));
        assert_eq!(pos.z.as_deref(), Some("15"));
    }

    #[test]
    fn center_beats_address() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/?center=52.52,13.405&address=Alexanderplatz")
        else {
            panic!("expected success");
        };
        assert!(pos.has_coordinates());
        assert_eq!(pos.q, None);
    }

    #[test]
    fn address_beats_plain_query() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/?address=1+Infinite+Loop&q=other")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.q.as_deref(), Some("1 Infinite Loop"));
    }

    #[test]
    fn name_is_used_when_address_missing() {
        let ParseUriResult::Succeeded(pos) = parse("https://maps.apple.com/?name=Louvre") else {
            panic!("expected success");
        };
        assert_eq!(pos.q.as_deref(), Some("Louvre"));
    }

    #[test]
    fn coordinate_query_falls_through_to_q() {
        let ParseUriResult::Succeeded(pos) = parse("https://maps.apple.com/?q=50.894967,4.341626")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("50.894967"));
    }

    #[test]
    fn malformed_zoom_is_dropped() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://maps.apple.com/?ll=50.894967,4.341626&z=spam")
        else {
            panic!("expected success");
        };
        assert!(pos.has_coordinates());
        assert_eq!(pos.z, None);
    }

    #[test]
    fn bare_host_without_parameters_fails() {
        assert_eq!(parse("https://maps.apple.com/"), ParseUriResult::Failed);
    }

    #[test]
    fn unknown_host_fails() {
        assert_eq!(
            parse("https://maps.banana.com/?ll=1,2"),
            ParseUriResult::Failed
        );
    }

    #[test]
    fn p_share_link_is_short() {
        let uri = Uri::parse("https://maps.apple.com/p/AB12cd34");
        let short = AppleMaps.short_uri(&uri).unwrap();
        assert_eq!(short.url, "https://maps.apple.com/p/AB12cd34");
        assert_eq!(short.method, ShortUriMethod::Get);
    }

    #[test]
    fn p_without_token_is_not_short() {
        assert!(AppleMaps
            .short_uri(&Uri::parse("https://maps.apple.com/p/"))
            .is_none());
        assert!(AppleMaps
            .short_uri(&Uri::parse("https://maps.apple.com/place?q=x"))
            .is_none());
    }

    #[test]
    fn finds_bare_host_link_in_text() {
        let found = AppleMaps
            .find_uri("see maps.apple.com/?ll=50.894967,4.341626 for the spot")
            .unwrap();
        assert_eq!(found.matched, "maps.apple.com/?ll=50.894967,4.341626");
    }
}
