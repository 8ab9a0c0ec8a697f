//! Compact coordinate codecs.
//!
//! Two string encodings show up in shared map links: geohash (Waze short
//! links carry one after `/ul/h`) and quadtile keys (OpenStreetMap short
//! links pack three quadkey digits per character). Both imply a zoom level
//! from their length alone.

mod geohash;
mod quadtile;

pub use geohash::decode_geo_hash;
pub use quadtile::decode_quad_tile;

/// A decoded point with the zoom level implied by the code's precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPoint {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl DecodedPoint {
    /// Degenerate result for empty or malformed codes. Callers treat it as
    /// "nothing decoded" rather than an error.
    pub const ORIGIN: DecodedPoint = DecodedPoint {
        lat: 0.0,
        lon: 0.0,
        zoom: 0,
    };
}
