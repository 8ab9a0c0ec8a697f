//! Quadtile (quadkey) decoding.

use std::f64::consts::PI;

use super::DecodedPoint;

/// Levels past this would overflow tile math; no shared link carries them.
const MAX_LEVELS: usize = 30;

/// How many trailing `-` zoom decrements are honoured.
const MAX_DASH_DECREMENT: usize = 2;

/// Decode a quadkey string to the center of its tile.
///
/// Each base-4 digit contributes one zoom level. Trailing `-` characters
/// each subtract one level from the implied zoom; capped at two and floored
/// at zero; while the digits still position the tile at full precision.
/// Empty input, a dash-only string, or any non-quadkey digit yields
/// [`DecodedPoint::ORIGIN`].
#[must_use]
pub fn decode_quad_tile(hash: &str) -> DecodedPoint {
    let digits = hash.trim_end_matches('-');
    let dashes = hash.len() - digits.len();
    if digits.is_empty() || digits.len() > MAX_LEVELS {
        return DecodedPoint::ORIGIN;
    }

    let mut x = 0u64;
    let mut y = 0u64;
    for c in digits.chars() {
        let digit = match c {
            '0' => 0u64,
            '1' => 1,
            '2' => 2,
            '3' => 3,
            _ => return DecodedPoint::ORIGIN,
        };
        x = (x << 1) | (digit & 1);
        y = (y << 1) | (digit >> 1);
    }

    #[allow(clippy::cast_precision_loss)]
    let n = (1u64 << digits.len()) as f64;
    #[allow(clippy::cast_precision_loss)]
    let lon = (x as f64 + 0.5) / n * 360.0 - 180.0;
    #[allow(clippy::cast_precision_loss)]
    let lat = (PI * (1.0 - 2.0 * (y as f64 + 0.5) / n)).sinh().atan().to_degrees();

    #[allow(clippy::cast_possible_truncation)]
    let zoom = digits.len().saturating_sub(dashes.min(MAX_DASH_DECREMENT)) as u8;

    DecodedPoint { lat, lon, zoom }
}
