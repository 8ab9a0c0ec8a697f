//! Normalized output of a conversion.
//!
//! A [`Position`] is what every per-service parser reduces a link to:
//! coordinates and/or a free-text query, an optional zoom, and an optional
//! multi-point route. Coordinates are kept as the exact source text; the
//! emitted `geo:` URI must reproduce the digits the link carried, not a
//! float round-trip of them.

use std::fmt::Write as _;

use crate::text::encode_component;

/// A single latitude/longitude pair, both as source text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub lat: String,
    pub lon: String,
}

impl Point {
    #[must_use]
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Point {
            lat: lat.into(),
            lon: lon.into(),
        }
    }
}

/// Normalized geographic position: coordinates, query, zoom, route points.
///
/// A position with none of those populated is the failure signal; see
/// [`Position::is_successful`].
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub q: Option<String>,
    pub z: Option<String>,
    pub points: Vec<Point>,
}

impl Position {
    #[must_use]
    pub fn from_lat_lon(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Position {
            lat: Some(lat.into()),
            lon: Some(lon.into()),
            ..Position::default()
        }
    }

    #[must_use]
    pub fn from_query(q: impl Into<String>) -> Self {
        Position {
            q: Some(q.into()),
            ..Position::default()
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, z: impl Into<String>) -> Self {
        self.z = Some(z.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// The primary coordinate pair: the singular lat/lon when set, otherwise
    /// the first route point.
    #[must_use]
    pub fn coordinates(&self) -> Option<Point> {
        match (&self.lat, &self.lon) {
            (Some(lat), Some(lon)) => Some(Point::new(lat.clone(), lon.clone())),
            _ => self.points.first().cloned(),
        }
    }

    /// All points, for GPX export: the route when present, else the singular
    /// coordinate pair.
    #[must_use]
    pub fn all_points(&self) -> Vec<Point> {
        if self.points.is_empty() {
            self.coordinates().into_iter().collect()
        } else {
            self.points.clone()
        }
    }

    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    #[must_use]
    pub fn has_query(&self) -> bool {
        self.q.as_deref().is_some_and(|q| !q.is_empty())
    }

    /// Whether this position carries anything downstream can use. An empty
    /// position signals parse failure.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.has_coordinates() || self.has_query() || !self.points.is_empty()
    }

    /// `geo:<lat>,<lon>?q=<enc>&z=<zoom>`, with the coordinate segment
    /// omitted entirely when no coordinates are known.
    #[must_use]
    pub fn to_geo_uri(&self) -> String {
        let mut out = String::from("geo:");
        if let Some(point) = self.coordinates() {
            let _ = write!(out, "{},{}", point.lat, point.lon);
        }
        let mut separator = '?';
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            out.push(separator);
            separator = '&';
            let _ = write!(out, "q={}", encode_component(q));
        }
        if let Some(z) = &self.z {
            out.push(separator);
            let _ = write!(out, "z={z}");
        }
        out
    }

    /// `https://maps.apple.com/?ll=...&z=...` (or `?q=...` without
    /// coordinates).
    #[must_use]
    pub fn to_apple_maps_url(&self) -> String {
        let mut out = String::from("https://maps.apple.com/?");
        if let Some(point) = self.coordinates() {
            let _ = write!(out, "ll={},{}", point.lat, point.lon);
        } else if let Some(q) = &self.q {
            let _ = write!(out, "q={}", encode_component(q));
        }
        if let Some(z) = &self.z {
            let _ = write!(out, "&z={z}");
        }
        out
    }

    /// `https://www.google.com/maps?q=...&z=...`; coordinates win over a
    /// query when both are known.
    #[must_use]
    pub fn to_google_maps_url(&self) -> String {
        let mut out = String::from("https://www.google.com/maps?q=");
        if let Some(point) = self.coordinates() {
            let _ = write!(out, "{},{}", point.lat, point.lon);
        } else if let Some(q) = &self.q {
            out.push_str(&encode_component(q));
        }
        if let Some(z) = &self.z {
            let _ = write!(out, "&z={z}");
        }
        out
    }

    /// `magicearth://?lat=...&lon=...&q=...&zoom=...`.
    #[must_use]
    pub fn to_magic_earth_url(&self) -> String {
        let mut out = String::from("magicearth://?");
        let mut first = true;
        let mut push = |out: &mut String, name: &str, value: &str| {
            if !first {
                out.push('&');
            }
            first = false;
            let _ = write!(out, "{name}={value}");
        };
        if let Some(point) = self.coordinates() {
            push(&mut out, "lat", &point.lat);
            push(&mut out, "lon", &point.lon);
        }
        if let Some(q) = &self.q {
            push(&mut out, "q", &encode_component(q));
        }
        if let Some(z) = &self.z {
            push(&mut out, "zoom", z);
        }
        out
    }

    /// Human-readable coordinates (`"50.894967, 4.341626"`), falling back to
    /// the query text.
    #[must_use]
    pub fn to_coordinate_string(&self) -> String {
        if let Some(point) = self.coordinates() {
            format!("{}, {}", point.lat, point.lon)
        } else {
            self.q.clone().unwrap_or_default()
        }
    }
}
