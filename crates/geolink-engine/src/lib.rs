//! The conversion engine.
//!
//! Given raw input text, [`Engine`] walks a finite-state graph: match the
//! text against the input registry, resolve short links and scrape HTML
//! behind user-permission gates, retry transient network failures, and
//! sequence the post-success automation action. Every state is an immutable
//! value; [`Engine::transition`] is the sole driver and returns `None` when
//! a state is terminal or awaiting external input.

pub mod automation;
pub mod billing;
pub mod cancel;
pub mod context;
pub mod error;
pub mod permission;
pub mod prefs;
pub mod retry;
pub mod state;

pub use automation::Automation;
pub use billing::{BillingObserver, BillingStatus, Product, StaticBilling};
pub use cancel::{cancellation, CancelHandle, CancelToken, WaitOutcome};
pub use context::{Engine, Timing, WebRenderer};
pub use error::FailureMessage;
pub use prefs::{InMemoryPreferences, PreferenceStore};
pub use retry::{Retry, MAX_NETWORK_RETRIES};
pub use state::{ConversionState, HtmlParseKind, InputRef};
