//! The `decode` subcommand: run the compact-code codecs directly.

use anyhow::bail;
use clap::{Args, Subcommand};
use geolink_core::codec::{decode_geo_hash, decode_quad_tile, DecodedPoint};

#[derive(Debug, Args)]
pub struct DecodeArgs {
    #[command(subcommand)]
    pub codec: Codec,
}

#[derive(Debug, Subcommand)]
pub enum Codec {
    /// Decode a geohash string (as found in Waze `/ul/h...` links).
    Geohash { code: String },
    /// Decode a quadtile key, with optional trailing `-` zoom decrements.
    Quadtile { code: String },
}

pub fn run(args: &DecodeArgs) -> anyhow::Result<()> {
    let (code, decoded) = match &args.codec {
        Codec::Geohash { code } => (code, decode_geo_hash(code)),
        Codec::Quadtile { code } => (code, decode_quad_tile(code)),
    };
    if decoded == DecodedPoint::ORIGIN {
        bail!("could not decode {code:?}");
    }
    println!("{:.6},{:.6} z{}", decoded.lat, decoded.lon, decoded.zoom);
    Ok(())
}
