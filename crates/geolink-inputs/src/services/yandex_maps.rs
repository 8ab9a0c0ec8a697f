//! Yandex Maps links.
//!
//! Yandex puts **longitude first** in every coordinate pair. Precedence,
//! highest first:
//!
//! 1. `pt=lon,lat` (the placed pin)
//! 2. `whatshere[point]=lon,lat` (the "what's here" popup)
//! 3. `ll=lon,lat` (map center)
//! 4. `text=` free text
//!
//! `yandex.<tld>/maps/-/<code>` short links resolve via a `HEAD` probe.

use geolink_core::{Position, Uri};
use regex::Regex;

use crate::helpers::{lon_lat_pair, zoom_param};
use crate::types::{ParseUriResult, ShortUri, ShortUriMethod, UriInput};

pub struct YandexMaps;

fn split_host(uri: &Uri) -> Option<(bool, String)> {
    let host = uri.host()?.to_ascii_lowercase();
    let re = Regex::new(r"^(?:www\.)?(maps\.)?yandex\.(?:ru|com\.tr|com|by|kz|ua|uz)$")
        .expect("valid regex");
    let cap = re.captures(&host)?;
    Some((cap.get(1).is_some(), host))
}

fn host_is_yandex_maps(uri: &Uri) -> bool {
    match split_host(uri) {
        Some((true, _)) => true,
        Some((false, _)) => uri.path().starts_with("/maps") || uri.path().starts_with("/harita"),
        None => false,
    }
}

fn scheme_ok(uri: &Uri) -> bool {
    matches!(uri.scheme(), None | Some("http" | "https" | "yandexmaps"))
}

impl UriInput for YandexMaps {
    fn id(&self) -> &'static str {
        "yandex_maps"
    }

    fn uri_pattern(&self) -> Regex {
        Regex::new(
            r"(?:https?://)?(?:www\.)?(?:maps\.yandex\.[a-z.]{2,6}(?:/[^\s]*)?|yandex\.[a-z.]{2,6}/(?:maps|harita)[^\s]*)",
        )
        .expect("valid regex")
    }

    fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        if !scheme_ok(uri) || !host_is_yandex_maps(uri) {
            return ParseUriResult::Failed;
        }

        let zoom = zoom_param(uri, &["z"]);

        for param in ["pt", "whatshere[point]", "ll"] {
            if let Some((lat, lon)) = uri.query_param(param).and_then(lon_lat_pair) {
                let mut pos = Position::from_lat_lon(lat, lon);
                pos.z = zoom;
                return ParseUriResult::Succeeded(pos);
            }
        }

        if let Some(text) = uri.query_param("text").filter(|t| !t.is_empty()) {
            let mut pos = Position::from_query(text);
            pos.z = zoom;
            return ParseUriResult::Succeeded(pos);
        }

        ParseUriResult::Failed
    }

    fn short_uri(&self, uri: &Uri) -> Option<ShortUri> {
        let (_, host) = split_host(uri)?;
        let code = uri
            .path()
            .strip_prefix("/maps/-/")
            .or_else(|| uri.path().strip_prefix("/harita/-/"))?;
        if code.is_empty() {
            return None;
        }
        Some(ShortUri {
            url: format!("https://{host}{}", uri.path()),
            method: ShortUriMethod::Head,
        })
    }
}
