//! Geohash decoding.

use super::DecodedPoint;

/// Geohash base32 alphabet (no `a`, `i`, `l`, `o`).
const BASE32: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

/// Zoom implied by hash length, indexed by length and clamped at the top.
const ZOOM_FOR_LENGTH: [u8; 10] = [0, 0, 1, 3, 6, 8, 11, 13, 16, 18];

pub(super) fn zoom_for_length(len: usize) -> u8 {
    ZOOM_FOR_LENGTH[len.min(ZOOM_FOR_LENGTH.len() - 1)]
}

/// Decode a geohash string to the midpoint of its bounding box.
///
/// Zoom comes purely from the hash length. Empty input or any character
/// outside the geohash alphabet yields [`DecodedPoint::ORIGIN`]; short-link
/// paths are matched loosely upstream, so garbage must degrade, not panic.
#[must_use]
pub fn decode_geo_hash(hash: &str) -> DecodedPoint {
    if hash.is_empty() {
        return DecodedPoint::ORIGIN;
    }

    let mut lat = (-90.0_f64, 90.0_f64);
    let mut lon = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for c in hash.chars() {
        let Some(index) = BASE32.find(c.to_ascii_lowercase()) else {
            return DecodedPoint::ORIGIN;
        };
        for shift in (0..5).rev() {
            let bit = (index >> shift) & 1;
            let range = if even_bit { &mut lon } else { &mut lat };
            let mid = (range.0 + range.1) / 2.0;
            if bit == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even_bit = !even_bit;
        }
    }

    DecodedPoint {
        lat: (lat.0 + lat.1) / 2.0,
        lon: (lon.0 + lon.1) / 2.0,
        zoom: zoom_for_length(hash.chars().count()),
    }
}
