//! Engine assembly: collaborators, timing knobs, construction.

use std::time::Duration;

use geolink_net::UrlClient;
use tokio::sync::mpsc;

use crate::billing::BillingObserver;
use crate::cancel::CancelToken;
use crate::prefs::PreferenceStore;

/// Host-provided embedded web renderer.
///
/// `open` starts rendering `url`; the returned channel yields the page's
/// URL every time it changes. Dropping the receiver tears the render down.
pub trait WebRenderer: Send + Sync {
    fn open(&self, url: &str) -> mpsc::Receiver<String>;
}

/// Tunable delays. Production defaults here; tests shrink them.
#[derive(Debug, Clone)]
pub struct Timing {
    /// How long a success/failure banner stays up before the flow finishes.
    pub result_display_delay: Duration,
    /// Bounded wait for an in-flight billing refresh to settle.
    pub billing_wait: Duration,
    /// How long a web render may search for a usable URL change.
    pub web_timeout: Duration,
    /// Base for the jittered back-off between network retries.
    pub retry_backoff_base: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            result_display_delay: Duration::from_secs(3),
            billing_wait: Duration::from_secs(2),
            web_timeout: Duration::from_secs(10),
            retry_backoff_base: Duration::from_millis(300),
        }
    }
}

/// The conversion engine: the state-machine driver plus its injected
/// collaborators. One engine serves any number of sequential conversions.
pub struct Engine<'a> {
    pub(crate) net: &'a UrlClient,
    pub(crate) prefs: &'a dyn PreferenceStore,
    pub(crate) billing: &'a dyn BillingObserver,
    pub(crate) web: Option<&'a dyn WebRenderer>,
    pub(crate) cancel: CancelToken,
    pub(crate) timing: Timing,
}

impl<'a> Engine<'a> {
    pub fn new(
        net: &'a UrlClient,
        prefs: &'a dyn PreferenceStore,
        billing: &'a dyn BillingObserver,
    ) -> Self {
        Engine {
            net,
            prefs,
            billing,
            web: None,
            cancel: CancelToken::never(),
            timing: Timing::default(),
        }
    }

    #[must_use]
    pub fn with_web_renderer(mut self, web: &'a dyn WebRenderer) -> Self {
        self.web = Some(web);
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}
