//! User-facing failure messages.
//!
//! Every failure terminates in `ConversionFailed(message, original_input)`
//!; never a raw error; so the UI can always echo the input and offer a
//! retry.

use std::fmt;

use geolink_net::NetError;

/// Message identifier carried by a failed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMessage {
    /// Input was empty or blank.
    MissingUrl,
    /// Nothing in the registry matched the input.
    UnsupportedService,
    /// The user's standing permission forbids network access.
    ConnectionPermissionDenied,
    /// Short-link resolution failed.
    UnshortenError,
    /// Short-link resolution failed on a connection/timeout problem.
    UnshortenConnectionError,
    /// The pattern matched but no position could be extracted.
    ParseUrlError,
    /// HTML fallback failed to produce a position.
    ParseHtmlError,
    /// HTML fallback failed on a connection/timeout problem.
    ParseHtmlConnectionError,
    /// The user cancelled mid-flight; shown as "no result", not an error.
    Cancelled,
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureMessage::MissingUrl => "no link or coordinates found in the input",
            FailureMessage::UnsupportedService => "this link is not from a supported map service",
            FailureMessage::ConnectionPermissionDenied => {
                "resolving this link needs a connection, which is disabled"
            }
            FailureMessage::UnshortenError => "could not resolve the short link",
            FailureMessage::UnshortenConnectionError => {
                "connection problem while resolving the short link"
            }
            FailureMessage::ParseUrlError => "could not read a location from the link",
            FailureMessage::ParseHtmlError => "could not read a location from the page",
            FailureMessage::ParseHtmlConnectionError => {
                "connection problem while reading the page"
            }
            FailureMessage::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Pick the unshorten-phase message for a terminal network error.
pub(crate) fn unshorten_failure(error: &NetError) -> FailureMessage {
    match error {
        NetError::Cancelled => FailureMessage::Cancelled,
        e if e.involves_timeout() => FailureMessage::UnshortenConnectionError,
        _ => FailureMessage::UnshortenError,
    }
}

/// Pick the HTML-phase message for a terminal network error.
pub(crate) fn parse_html_failure(error: &NetError) -> FailureMessage {
    match error {
        NetError::Cancelled => FailureMessage::Cancelled,
        e if e.involves_timeout() => FailureMessage::ParseHtmlConnectionError,
        _ => FailureMessage::ParseHtmlError,
    }
}
