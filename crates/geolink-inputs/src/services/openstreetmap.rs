//! OpenStreetMap links.
//!
//! Extraction precedence, highest first:
//!
//! 1. `mlat`/`mlon` marker parameters (the pin), with zoom borrowed from
//!    the `#map=` fragment when present
//! 2. the `#map=zoom/lat/lon` fragment (the viewport)
//! 3. `/search?query=` free text
//!
//! `osm.org/go/<code>` short links decode *locally*: each code character
//! expands to three quadkey digits, trailing `-` marks pass through to the
//! quadtile decoder's zoom decrement. No network hop is needed.
//!
//! Element pages (`/node/<id>`, `/way/<id>`, `/relation/<id>`) carry no
//! coordinates in the URL; the public API's XML for the element does, so
//! those matches advertise HTML parsing against the API URL.

use geolink_core::codec::decode_quad_tile;
use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{coordinate, zoom};
use crate::types::{ParseHtmlResult, ParseUriResult, UriInput};

pub struct OpenStreetMap;

/// Shortlink code alphabet; `@` is a legacy alias for `~`.
const GO_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_~";

fn host_is_osm(uri: &Uri) -> bool {
    const HOSTS: [&str; 4] = [
        "openstreetmap.org",
        "www.openstreetmap.org",
        "osm.org",
        "www.osm.org",
    ];
    uri.host()
        .is_some_and(|host| HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)))
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https"))
}

/// `map=zoom/lat/lon` fragment → (zoom, lat, lon).
fn parse_map_fragment(fragment: &str) -> Option<(Option<String>, String, String)> {
    let re = Regex::new(r"map=([^/]+)/(-?\d{1,3}(?:\.\d+)?)/(-?\d{1,3}(?:\.\d+)?)")
        .expect("valid regex");
    let cap = re.captures(fragment)?;
    let lat = coordinate(&cap[2])?.to_owned();
    let lon = coordinate(&cap[3])?.to_owned();
    Some((zoom(&cap[1]), lat, lon))
}

/// Expand an `osm.org/go/` code into a quadtile string and decode it.
fn decode_go_code(code: &str) -> Option<Position> {
    let digits_part = code.trim_end_matches('-');
    let dashes = code.len() - digits_part.len();

    let mut quad = String::new();
    for c in digits_part.chars() {
        let c = if c == '@' { '~' } else { c };
        let value = GO_ALPHABET.find(c)?;
        for shift in [4u32, 2, 0] {
            let digit = (value >> shift) & 0b11;
            quad.push(char::from(b'0' + u8::try_from(digit).ok()?));
        }
    }
    quad.extend(std::iter::repeat('-').take(dashes.min(2)));

    let decoded = decode_quad_tile(&quad);
    if quad.trim_end_matches('-').is_empty() {
        return None;
    }
    let mut pos = Position::from_lat_lon(
        format!("{:.5}", decoded.lat),
        format!("{:.5}", decoded.lon),
    );
    pos.z = Some(decoded.zoom.to_string());
    Some(pos)
}

fn element_api_url(path: &str) -> Option<(String, String)> {
    let re = Regex::new(r"^/(node|way|relation)/(\d+)").expect("valid regex");
    let cap = re.captures(path)?;
    let kind = cap[1].to_owned();
    let id = cap[2].to_owned();
    let suffix = if kind == "node" { "" } else { "/full" };
    Some((
        format!("{kind} {id}"),
        format!("https://www.openstreetmap.org/api/0.6/{kind}/{id}{suffix}"),
    ))
}

impl UriInput for OpenStreetMap {
    fn id(&self) -> &'static str {
        "openstreetmap"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(r"(?:https?://)?(?:www\.)?(?:openstreetmap|osm)\.org(?:/[^\s]*)?(?:\?[^\s]*)?(?:#[^\s]*)?")
            .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || !host_is_osm(uri) {
            return ParseUriResult::Failed;
        }

        if let Some(code) = uri.path().strip_prefix("/go/") {
            if let Some(pos) = decode_go_code(code) {
                return ParseUriResult::Succeeded(pos);
            }
            return ParseUriResult::Failed;
        }

        let fragment = uri.fragment().and_then(parse_map_fragment);

        let marker = match (
            uri.query_param("mlat").and_then(coordinate),
            uri.query_param("mlon").and_then(coordinate),
        ) {
            (Some(lat), Some(lon)) => Some((lat.to_owned(), lon.to_owned())),
            _ => None,
        };

        if let Some((lat, lon)) = marker {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.z = fragment.and_then(|(z, _, _)| z);
            return ParseUriResult::Succeeded(pos);
        }

        if let Some((z, lat, lon)) = fragment {
            let mut pos = Position::from_lat_lon(lat, lon);
            pos.z = z;
            return ParseUriResult::Succeeded(pos);
        }

        if uri.path().starts_with("/search") {
            if let Some(query) = uri.query_param("query").filter(|q| !q.is_empty()) {
                return ParseUriResult::Succeeded(Position::from_query(query));
            }
        }

        if let Some((label, api_url)) = element_api_url(uri.path()) {
            return ParseUriResult::SucceededAndSupportsHtmlParsing(
                Position::from_query(label),
                api_url,
            );
        }

        ParseUriResult::Failed
    }

    fn supports_html_parsing(&self) -> bool {
        true
    }

    fn parse_html(&self, html: &str, points_from_uri: &Position) -> ParseHtmlResult {
        // API XML: <node ... lat="44.44" lon="26.08" ...>
        let re = Regex::new(r#"lat="(-?\d{1,3}(?:\.\d+)?)"\s+lon="(-?\d{1,3}(?:\.\d+)?)""#)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParseUriResult {
        OpenStreetMap.parse_uri(&Uri::parse(raw))
    }

    #[test]
    fn map_fragment() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://www.openstreetmap.org/#map=12/52.5200/13.4050")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("52.5200"));
        assert_eq!(pos.lon.as_deref(), Some("13.4050"));
        assert_eq!(pos.z.as_deref(), Some("12"));
    }

    #[test]
    fn marker_beats_map_fragment_but_borrows_zoom() {
        let ParseUriResult::Succeeded(pos) = parse(
            "https://www.openstreetmap.org/?mlat=52.5163&mlon=13.3777#map=17/52.5200/13.4050",
        ) else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("52.5163"));
        assert_eq!(pos.lon.as_deref(), Some("13.3777"));
        assert_eq!(pos.z.as_deref(), Some("17"));
    }

    #[test]
    fn malformed_fragment_zoom_is_dropped() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://www.openstreetmap.org/#map=spam/52.5200/13.4050")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("52.5200"));
        assert_eq!(pos.z, None);
    }

    #[test]
    fn search_query() {
        let ParseUriResult::Succeeded(pos) =
            parse("https://www.openstreetmap.org/search?query=Brandenburger+Tor")
        else {
            panic!("expected success");
        };
        assert_eq!(pos.q.as_deref(), Some("Brandenburger Tor"));
    }

    #[test]
    fn node_page_supports_html_parsing() {
        let result = parse("https://www.openstreetmap.org/node/240109189");
        let ParseUriResult::SucceededAndSupportsHtmlParsing(pos, url) = result else {
            panic!("expected html-capable success, got {result:?}");
        };
        assert_eq!(pos.q.as_deref(), Some("node 240109189"));
        assert_eq!(
            url,
            "https://www.openstreetmap.org/api/0.6/node/240109189"
        );
    }

    #[test]
    fn way_page_uses_full_api() {
        let ParseUriResult::SucceededAndSupportsHtmlParsing(_, url) =
            parse("https://www.openstreetmap.org/way/38407529")
        else {
            panic!("expected html-capable success");
        };
        assert_eq!(
            url,
            "https://www.openstreetmap.org/api/0.6/way/38407529/full"
        );
    }

    #[test]
    fn api_xml_yields_coordinates() {
        let xml = r#"<osm><node id="240109189" lat="52.5170365" lon="13.3888599" version="5"/></osm>"#;
        let from_uri = Position::from_query("node 240109189");
        let ParseHtmlResult::Succeeded(pos) = OpenStreetMap.parse_html(xml, &from_uri) else {
            panic!("expected success");
        };
        assert_eq!(pos.lat.as_deref(), Some("52.5170365"));
        assert_eq!(pos.lon.as_deref(), Some("13.3888599"));
        assert_eq!(pos.q.as_deref(), Some("node 240109189"));
    }

    #[test]
    fn go_short_link_decodes_locally() {
        let ParseUriResult::Succeeded(pos) = parse("https://osm.org/go/0EEQjE--") else {
            panic!("expected success");
        };
        let lat: f64 = pos.lat.unwrap().parse().unwrap();
        let lon: f64 = pos.lon.unwrap().parse().unwrap();
        assert!(lat.abs() <= 90.0);
        assert!(lon.abs() <= 180.0);
        let z: u8 = pos.z.unwrap().parse().unwrap();
        // 6 code chars → 18 quad digits, minus the two-dash decrement.
        assert_eq!(z, 16);
    }

    #[test]
    fn go_with_invalid_characters_fails() {
        assert_eq!(parse("https://osm.org/go/$$$"), ParseUriResult::Failed);
    }

    #[test]
    fn unknown_host_fails() {
        assert_eq!(
            parse("https://opensomethingmap.org/#map=12/1/2"),
            ParseUriResult::Failed
        );
    }

    #[test]
    fn finds_link_with_fragment_in_text() {
        let found = OpenStreetMap
            .find_uri("view https://www.openstreetmap.org/#map=12/52.52/13.405 here")
            .unwrap();
        assert_eq!(
            found.matched,
            "https://www.openstreetmap.org/#map=12/52.52/13.405"
        );
    }
}
