//! Shared text primitives: percent-encoding sets, component decoding, and
//! display truncation.
//!
//! The encoding sets are deliberately explicit rather than borrowed from a
//! URL library so that serialized output stays byte-stable across dependency
//! upgrades; several callers pin exact encoded strings in tests.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

/// Characters escaped inside a URI path. `/`, `,`, `@`, `:` and the other
/// sub-delimiters stay literal; map URLs lean on literal `@44.1,26.0` path
/// segments.
pub const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

/// Strict component escape: everything but unreserved characters. Used for
/// query names/values and for `q=` payloads in emitted `geo:` URIs.
pub const COMPONENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a path, leaving separator characters intact.
#[must_use]
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPE).to_string()
}

/// Percent-encode a single query name or value.
#[must_use]
pub fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT_ESCAPE).to_string()
}

/// Percent-decode a path or fragment component. Invalid UTF-8 sequences are
/// replaced rather than rejected; inputs here come from arbitrary shared text.
#[must_use]
pub fn decode_component(component: &str) -> String {
    percent_decode_str(component).decode_utf8_lossy().into_owned()
}

/// Percent-decode a query name or value, additionally folding `+` into a
/// space (form encoding, used by several map services for search terms).
#[must_use]
pub fn decode_query_component(component: &str) -> String {
    if component.contains('+') {
        let spaced = component.replace('+', " ");
        percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
    } else {
        decode_component(component)
    }
}

/// Truncate `s` to at most `max_chars` characters, appending an ellipsis when
/// anything was cut. Operates on `char` boundaries, never bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_chars {
        return Cow::Borrowed(s);
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    Cow::Owned(format!("{kept}\u{2026}"))
}
