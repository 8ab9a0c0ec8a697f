//! Error taxonomy for the HTTP collaborator.
//!
//! The conversion engine retries *recoverable* failures (timeout-class
//! conditions that a second attempt can fix), fails immediately on
//! *unrecoverable* ones, and treats *cancellation* as its own outcome;
//! neither retried nor reported as an error banner.

use std::error::Error as _;

use thiserror::Error;

/// Which transient condition made a request recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverableKind {
    /// The request or socket read timed out.
    Timeout,
    /// The TCP/TLS connection could not be established.
    Connect,
}

#[derive(Debug, Error)]
pub enum NetError {
    /// Timeout-class failure worth retrying.
    #[error("connection problem reaching {url}")]
    Recoverable {
        url: String,
        kind: RecoverableKind,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx/3xx response or a malformed exchange; retrying won't fix it.
    /// `timeout_cause` records whether a timeout hides in the cause chain;
    /// user-facing messaging treats those as connection problems.
    #[error("unexpected response from {url} (status {status:?})")]
    Unrecoverable {
        url: String,
        status: Option<u16>,
        timeout_cause: bool,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The host cancelled the in-flight request.
    #[error("request cancelled")]
    Cancelled,

    /// The underlying client could not be constructed.
    #[error("failed to construct HTTP client")]
    Build(#[source] reqwest::Error),
}

impl NetError {
    /// Classify a transport-level `reqwest` failure for `url`.
    #[must_use]
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            NetError::Recoverable {
                url: url.to_owned(),
                kind: RecoverableKind::Timeout,
                source,
            }
        } else if source.is_connect() {
            NetError::Recoverable {
                url: url.to_owned(),
                kind: RecoverableKind::Connect,
                source,
            }
        } else {
            let status = source.status().map(|s| s.as_u16());
            let timeout_cause = has_timeout_cause(&source);
            NetError::Unrecoverable {
                url: url.to_owned(),
                status,
                timeout_cause,
                source: Some(source),
            }
        }
    }

    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NetError::Recoverable { .. })
    }

    /// True when the failure traces back to a timeout, whether it surfaced
    /// as the recoverable class or buried in an unrecoverable cause chain.
    #[must_use]
    pub fn involves_timeout(&self) -> bool {
        match self {
            NetError::Recoverable { kind, .. } => {
                matches!(kind, RecoverableKind::Timeout | RecoverableKind::Connect)
            }
            NetError::Unrecoverable { timeout_cause, .. } => *timeout_cause,
            NetError::Cancelled | NetError::Build(_) => false,
        }
    }
}

/// Walk the cause chain looking for a timeout.
fn has_timeout_cause(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return true;
    }
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        if cause.to_string().contains("timed out") {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_failure_is_recoverable() {
        // Nothing listens on this port; reqwest reports a connect error.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/x")
            .send()
            .await
            .unwrap_err();
        let classified = NetError::from_reqwest("http://127.0.0.1:9/x", err);
        assert!(classified.is_recoverable());
        assert!(classified.involves_timeout());
    }

    #[test]
    fn cancelled_is_neither_recoverable_nor_timeout() {
        assert!(!NetError::Cancelled.is_recoverable());
        assert!(!NetError::Cancelled.involves_timeout());
    }
}
