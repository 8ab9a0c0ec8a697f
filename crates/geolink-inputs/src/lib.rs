//! Per-service link parsers ("inputs").
//!
//! One module per mapping service. Every input is a stateless bundle of
//! patterns and extraction rules over the generic [`geolink_core::Uri`]
//! model: pure data-in/data-out, unit-testable without network or OS
//! dependencies. The conversion engine drives them through the capability
//! surface in [`types::UriInput`].

mod helpers;
pub mod registry;
pub mod services;
pub mod types;

pub use registry::{find_input, inputs, match_input};
pub use types::{ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod, UriInput, UriMatch};
