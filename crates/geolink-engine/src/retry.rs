//! Bounded retry policy for transient network failures.
//!
//! The retry counter is pure value-threading: it travels forward inside the
//! state value and the same state re-enters `transition` with `count + 1`.
//! Only timeout-class ([`NetError::Recoverable`]) failures are retried;
//! everything else escalates to a terminal failure on first occurrence.

use geolink_net::{NetError, RecoverableKind};

/// Cap on additional attempts after the first try.
pub const MAX_NETWORK_RETRIES: u8 = 2;

/// Retry bookkeeping threaded through a retrying state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    pub count: u8,
    pub last_error: RecoverableKind,
}

/// Whether `error` warrants another attempt given the retries so far.
#[must_use]
pub fn should_retry(error: &NetError, previous: Option<&Retry>) -> bool {
    error.is_recoverable() && previous.map_or(0, |r| r.count) < MAX_NETWORK_RETRIES
}

/// The `Retry` value for the next attempt. `None` when `error` is not a
/// recoverable class.
#[must_use]
pub fn next_retry(error: &NetError, previous: Option<&Retry>) -> Option<Retry> {
    match error {
        NetError::Recoverable { kind, .. } => Some(Retry {
            count: previous.map_or(0, |r| r.count) + 1,
            last_error: *kind,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unrecoverable() -> NetError {
        NetError::Unrecoverable {
            url: "https://example.com/".to_owned(),
            status: Some(500),
            timeout_cause: false,
            source: None,
        }
    }

    #[test]
    fn unrecoverable_is_never_retried() {
        assert!(!should_retry(&unrecoverable(), None));
        assert_eq!(next_retry(&unrecoverable(), None), None);
    }

    #[test]
    fn cancellation_is_never_retried() {
        assert!(!should_retry(&NetError::Cancelled, None));
    }

    #[tokio::test]
    async fn recoverable_counts_up_to_the_cap() {
        // A real connect failure gives us a Recoverable to thread through.
        let source = reqwest::Client::new()
            .get("http://127.0.0.1:9/x")
            .send()
            .await
            .unwrap_err();
        let error = NetError::from_reqwest("http://127.0.0.1:9/x", source);
        assert!(error.is_recoverable(), "premise: connect errors recover");

        assert!(should_retry(&error, None));
        let first = next_retry(&error, None).unwrap();
        assert_eq!(first.count, 1);

        assert!(should_retry(&error, Some(&first)));
        let second = next_retry(&error, Some(&first)).unwrap();
        assert_eq!(second.count, 2);

        assert!(
            !should_retry(&error, Some(&second)),
            "count 2 has exhausted the cap"
        );
    }
}
