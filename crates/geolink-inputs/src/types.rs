//! The input capability surface.
//!
//! Every mapping service implements [`UriInput`]. The mandatory capability
//! is URI matching + extraction; short-link resolution, HTML parsing, and
//! web-render parsing are optional and composable; the default methods
//! declare "not supported" and the engine checks before granting any
//! network permission.

use geolink_core::{Position, Uri};
use regex::Regex;

/// HTTP method used to reveal a short link's long form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortUriMethod {
    Head,
    Get,
}

/// A recognized short link, normalized to an absolute URL, plus how to
/// resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortUri {
    pub url: String,
    pub method: ShortUriMethod,
}

/// Where a service's URL was found inside free-form text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriMatch {
    pub start: usize,
    pub matched: String,
}

/// Outcome of extracting a position from a URI.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseUriResult {
    /// The URI alone yielded a usable position.
    Succeeded(Position),
    /// A position (possibly query-only) was extracted, and fetching the
    /// given URL's HTML could upgrade it to coordinates.
    SucceededAndSupportsHtmlParsing(Position, String),
    /// As above, but the page needs a full web render to reveal its final
    /// URL.
    SucceededAndSupportsWebParsing(Position, String),
    /// Pattern matched but nothing extractable was present.
    Failed,
}

/// Outcome of extracting a position from a fetched HTML/JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseHtmlResult {
    Succeeded(Position),
    /// The body pointed at another URL; re-enter the pipeline there.
    RequiresRedirect(String),
    /// The body cannot be parsed statically; a web render of the given URL
    /// is needed.
    RequiresWebParsing(String),
    Failed,
}

/// A per-service link parser.
///
/// Implementations are stateless unit structs registered once in
/// [`crate::registry`]. Patterns are compiled in the methods that use them;
/// the literals are static so compilation cannot fail at runtime.
pub trait UriInput: Send + Sync {
    /// Stable identifier, used for logging and permission prompts.
    fn id(&self) -> &'static str;

    /// The pattern locating this service's URLs as substrings of free text.
    fn uri_pattern(&self) -> Regex;

    /// Extract candidate positions from a parsed URI.
    fn parse_uri(&self, uri: &Uri) -> ParseUriResult;

    /// Locate the leftmost occurrence of this service's URL inside `text`.
    ///
    /// A match glued to the tail of a larger token (`ftp://maps.apple.com`)
    /// is rejected: the character before the match must be text-boundary
    /// punctuation or whitespace.
    fn find_uri(&self, text: &str) -> Option<UriMatch> {
        let pattern = self.uri_pattern();
        for found in pattern.find_iter(text) {
            let boundary_ok = text[..found.start()]
                .chars()
                .next_back()
                .is_none_or(|c| c.is_whitespace() || matches!(c, '(' | '[' | '{' | '<' | '"' | '\'' | ',' | ';'));
            if boundary_ok {
                return Some(UriMatch {
                    start: found.start(),
                    matched: found.as_str().to_owned(),
                });
            }
        }
        None
    }

    /// Identify a short-link form of `uri` needing network resolution.
    fn short_uri(&self, _uri: &Uri) -> Option<ShortUri> {
        None
    }

    fn supports_html_parsing(&self) -> bool {
        false
    }

    fn supports_web_parsing(&self) -> bool {
        false
    }

    /// Extract a position from a fetched body, given whatever the URI
    /// already yielded.
    fn parse_html(&self, _html: &str, _points_from_uri: &Position) -> ParseHtmlResult {
        ParseHtmlResult::Failed
    }
}
