//! Shared coordinate/zoom extraction primitives for the service parsers.

/// Validate a single decimal coordinate and return it trimmed, exactly as
/// written. Range is checked loosely (`±180`); services disagree on
/// latitude clamping and the consuming map app re-validates anyway.
pub(crate) fn coordinate(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if value.is_finite() && value.abs() <= 180.0 {
        Some(trimmed)
    } else {
        None
    }
}

/// Split a `"lat,lon"` pair. Both halves must be valid decimal coordinates.
pub(crate) fn lat_lon_pair(raw: &str) -> Option<(String, String)> {
    let (lat, lon) = raw.split_once(',')?;
    // A trailing third component (altitude, pin type) is tolerated and dropped.
    let lon = lon.split(',').next().unwrap_or(lon);
    Some((coordinate(lat)?.to_owned(), coordinate(lon)?.to_owned()))
}

/// Split a `"lon,lat"` pair (Yandex and Mapy put longitude first) into
/// `(lat, lon)` order.
pub(crate) fn lon_lat_pair(raw: &str) -> Option<(String, String)> {
    let (lon, lat) = raw.split_once(',')?;
    let lat = lat.split(',').next().unwrap_or(lat);
    Some((coordinate(lat)?.to_owned(), coordinate(lon)?.to_owned()))
}

/// Validate a zoom value. Malformed zoom is dropped, never an error:
/// `z=spam` must not sink an otherwise good match.
pub(crate) fn zoom(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let value: f64 = trimmed.parse().ok()?;
    if value.is_finite() && (0.0..=30.0).contains(&value) {
        Some(trimmed.to_owned())
    } else {
        None
    }
}

/// First zoom-looking value among `names` in the query.
pub(crate) fn zoom_param(uri: &geolink_core::Uri, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| uri.query_param(name).and_then(zoom))
}

/// The opaque part of a non-hierarchical URI: `geo:44.1,26.0` parses its
/// payload as the host, while a pasted bare `44.1, 26.0` lands in the path.
pub(crate) fn opaque_part(uri: &geolink_core::Uri) -> &str {
    uri.host().unwrap_or_else(|| uri.path())
}
