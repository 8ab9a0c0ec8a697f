//! The ordered input registry.
//!
//! Inputs are tried in declaration order and the first whose pattern finds
//! an acceptable substring wins; within one input the leftmost occurrence
//! is taken. Specific services come first, the raw-coordinate catch-all
//! last, so a pasted Google link never falls through to coordinate
//! scraping of its path digits.

use crate::services::{
    AppleMaps, Coordinates, GeoUri, GoogleMaps, HereWeGo, MagicEarth, Mapy, OpenStreetMap,
    OrganicMaps, OsmAnd, Waze, YandexMaps,
};
use crate::types::{UriInput, UriMatch};

static REGISTRY: &[&dyn UriInput] = &[
    &GeoUri,
    &GoogleMaps,
    &AppleMaps,
    &OpenStreetMap,
    &Waze,
    &YandexMaps,
    &Mapy,
    &HereWeGo,
    &OsmAnd,
    &OrganicMaps,
    &MagicEarth,
    &Coordinates,
];

/// All registered inputs, in match priority order.
#[must_use]
pub fn inputs() -> &'static [&'static dyn UriInput] {
    REGISTRY
}

/// Look an input up by its stable id.
#[must_use]
pub fn find_input(id: &str) -> Option<&'static dyn UriInput> {
    REGISTRY.iter().copied().find(|input| input.id() == id)
}

/// Match raw text against the registry: first input (in registry order)
/// whose pattern locates a URL substring wins.
#[must_use]
pub fn match_input(text: &str) -> Option<(&'static dyn UriInput, UriMatch)> {
    for input in REGISTRY {
        if let Some(found) = input.find_uri(text) {
            tracing::debug!(input = input.id(), start = found.start, "matched input");
            return Some((*input, found));
        }
    }
    None
}
