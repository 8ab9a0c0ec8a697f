//! The conversion state machine.
//!
//! One [`ConversionState`] value exists per conversion attempt. The
//! [`Engine::transition`] driver consumes a state and returns the next one,
//! or `None` when the state is terminal or parked awaiting external input
//! (permission dialogs, host-executed actions). Permission answers arrive
//! through [`Engine::grant`]/[`Engine::deny`]; host events feed back in
//! through the `ConversionState` event methods.
//!
//! States are plain values: transitioning never mutates in place, and the
//! same state with the same collaborator responses always produces an equal
//! next state.

use std::fmt;
use std::ops::Deref;
use std::time::Duration;

use geolink_core::position::Point;
use geolink_core::{Permission, Position, Uri};
use geolink_inputs::{ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod, UriInput};
use geolink_net::{NetError, ProbeMethod};

use crate::automation::Automation;
use crate::billing::BillingStatus;
use crate::cancel::WaitOutcome;
use crate::context::Engine;
use crate::error::{parse_html_failure, unshorten_failure, FailureMessage};
use crate::permission::{effective_permission, persist_decision};
use crate::retry::{next_retry, should_retry, Retry};

/// A registry input carried inside state values. Compares by id so that
/// states stay `PartialEq` without asking the trait objects themselves.
#[derive(Clone, Copy)]
pub struct InputRef(pub &'static dyn UriInput);

impl PartialEq for InputRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id() == other.0.id()
    }
}

impl Eq for InputRef {}

impl fmt::Debug for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputRef({})", self.0.id())
    }
}

impl Deref for InputRef {
    type Target = dyn UriInput + 'static;

    fn deref(&self) -> &(dyn UriInput + 'static) {
        self.0
    }
}

/// Which parse fallback a pending permission request would unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlParseKind {
    Html,
    Web,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    Initial,
    ReceivedUriString {
        input: String,
    },
    ReceivedUri {
        input: String,
        service: InputRef,
        uri: Uri,
        permission: Option<Permission>,
    },
    /// Awaiting the user's unshorten-permission answer.
    RequestedUnshortenPermission {
        input: String,
        service: InputRef,
        uri: Uri,
        short: ShortUri,
    },
    GrantedUnshortenPermission {
        input: String,
        service: InputRef,
        uri: Uri,
        short: ShortUri,
        retry: Option<Retry>,
    },
    DeniedConnectionPermission {
        input: String,
    },
    UnshortenedUrl {
        input: String,
        service: InputRef,
        uri: Uri,
        permission: Option<Permission>,
    },
    /// Awaiting the user's parse-page permission answer.
    RequestedParseHtmlPermission {
        input: String,
        service: InputRef,
        position: Position,
        url: String,
        kind: HtmlParseKind,
    },
    GrantedParseHtmlPermission {
        input: String,
        service: InputRef,
        position: Position,
        url: String,
        retry: Option<Retry>,
    },
    DeniedParseHtmlPermission {
        input: String,
        position: Position,
    },
    GrantedParseWebPermission {
        input: String,
        service: InputRef,
        position: Position,
        url: String,
    },
    ConversionSucceeded {
        position: Position,
    },
    ConversionFailed {
        message: FailureMessage,
        input: String,
    },
    /// Countdown before a disruptive automation runs.
    ActionWaiting {
        position: Position,
        action: Automation,
        delay: Duration,
    },
    ActionReady {
        position: Position,
        action: Automation,
    },
    /// Terminal for the engine: the host executes the action and reports
    /// back via [`ConversionState::action_ran`].
    BasicActionReady {
        position: Position,
        action: Automation,
    },
    LocationRationaleRequested {
        position: Position,
        action: Automation,
    },
    LocationRationaleShown {
        position: Position,
        action: Automation,
    },
    LocationRationaleConfirmed {
        position: Position,
        action: Automation,
    },
    LocationPermissionReceived {
        position: Position,
        action: Automation,
    },
    LocationReceived {
        position: Position,
        action: Automation,
        location: Option<Point>,
    },
    /// Terminal for the engine: the host executes the location-carrying
    /// action and reports back via [`ConversionState::action_ran`].
    LocationActionReady {
        position: Position,
        action: Automation,
        location: Point,
    },
    LocationFindingFailed,
    ActionRan {
        success: Option<bool>,
    },
    ActionSucceeded,
    ActionFailed,
    ActionFinished,
}

impl ConversionState {
    /// Entry point: wrap freshly received input text.
    #[must_use]
    pub fn received(input: impl Into<String>) -> Self {
        ConversionState::ReceivedUriString {
            input: input.into(),
        }
    }

    /// No further transition will ever occur.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversionState::ConversionFailed { .. } | ConversionState::ActionFinished
        )
    }

    /// Parked until an explicit external event arrives.
    #[must_use]
    pub fn awaits_external_input(&self) -> bool {
        matches!(
            self,
            ConversionState::RequestedUnshortenPermission { .. }
                | ConversionState::RequestedParseHtmlPermission { .. }
                | ConversionState::LocationRationaleRequested { .. }
                | ConversionState::LocationRationaleShown { .. }
                | ConversionState::LocationRationaleConfirmed { .. }
                | ConversionState::LocationPermissionReceived { .. }
                | ConversionState::BasicActionReady { .. }
                | ConversionState::LocationActionReady { .. }
        )
    }

    /// The successful position, wherever the flow currently carries one.
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        match self {
            ConversionState::ConversionSucceeded { position }
            | ConversionState::ActionWaiting { position, .. }
            | ConversionState::ActionReady { position, .. }
            | ConversionState::BasicActionReady { position, .. }
            | ConversionState::LocationRationaleRequested { position, .. }
            | ConversionState::LocationRationaleShown { position, .. }
            | ConversionState::LocationRationaleConfirmed { position, .. }
            | ConversionState::LocationPermissionReceived { position, .. }
            | ConversionState::LocationReceived { position, .. }
            | ConversionState::LocationActionReady { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Failure message and the original input, for the retry-capable error
    /// surface.
    #[must_use]
    pub fn failure(&self) -> Option<(FailureMessage, &str)> {
        match self {
            ConversionState::ConversionFailed { message, input } => Some((*message, input)),
            _ => None,
        }
    }

    /// Host event: the location rationale dialog was displayed.
    #[must_use]
    pub fn rationale_shown(self) -> Option<ConversionState> {
        match self {
            ConversionState::LocationRationaleRequested { position, action } => {
                Some(ConversionState::LocationRationaleShown { position, action })
            }
            _ => None,
        }
    }

    /// Host event: the OS granted the location permission.
    #[must_use]
    pub fn location_permission_received(self) -> Option<ConversionState> {
        match self {
            ConversionState::LocationRationaleConfirmed { position, action } => {
                Some(ConversionState::LocationPermissionReceived { position, action })
            }
            _ => None,
        }
    }

    /// Host event: the location query finished (possibly empty-handed).
    #[must_use]
    pub fn location_received(self, location: Option<Point>) -> Option<ConversionState> {
        match self {
            ConversionState::LocationPermissionReceived { position, action } => {
                Some(ConversionState::LocationReceived {
                    position,
                    action,
                    location,
                })
            }
            _ => None,
        }
    }

    /// Host event: the action executor finished. `None` means the action
    /// was a no-op.
    #[must_use]
    pub fn action_ran(self, success: Option<bool>) -> Option<ConversionState> {
        match self {
            ConversionState::BasicActionReady { .. }
            | ConversionState::LocationActionReady { .. } => {
                Some(ConversionState::ActionRan { success })
            }
            _ => None,
        }
    }
}

fn resolve_against(base_url: &str, target: &str) -> Uri {
    let base = Uri::parse(base_url);
    Uri::parse(target).to_absolute_url(
        base.scheme().unwrap_or("https"),
        base.host().unwrap_or(""),
        "/",
    )
}

fn probe_method(method: ShortUriMethod) -> ProbeMethod {
    match method {
        ShortUriMethod::Head => ProbeMethod::Head,
        ShortUriMethod::Get => ProbeMethod::Get,
    }
}

impl Engine<'_> {
    /// Advance `state` one step.
    ///
    /// Returns `None` when the state is terminal or must wait for an
    /// external event. Suspends cooperatively for network I/O and timed
    /// delays; the cancel token is honoured at every suspension point.
    #[allow(clippy::too_many_lines)]
    pub async fn transition(&self, state: ConversionState) -> Option<ConversionState> {
        match state {
            ConversionState::Initial
            | ConversionState::RequestedUnshortenPermission { .. }
            | ConversionState::RequestedParseHtmlPermission { .. }
            | ConversionState::LocationRationaleRequested { .. }
            | ConversionState::LocationRationaleShown { .. }
            | ConversionState::LocationRationaleConfirmed { .. }
            | ConversionState::LocationPermissionReceived { .. }
            | ConversionState::BasicActionReady { .. }
            | ConversionState::LocationActionReady { .. }
            | ConversionState::ConversionFailed { .. }
            | ConversionState::ActionFinished => None,

            ConversionState::ReceivedUriString { input } => Some(self.match_input_text(input)),

            ConversionState::ReceivedUri {
                input,
                service,
                uri,
                permission,
            } => Some(self.check_short_uri(input, service, uri, permission)),

            ConversionState::GrantedUnshortenPermission {
                input,
                service,
                uri,
                short,
                retry,
            } => Some(self.unshorten(input, service, uri, short, retry).await),

            ConversionState::DeniedConnectionPermission { input } => {
                Some(ConversionState::ConversionFailed {
                    message: FailureMessage::ConnectionPermissionDenied,
                    input,
                })
            }

            ConversionState::UnshortenedUrl {
                input,
                service,
                uri,
                permission,
            } => Some(self.parse_unshortened(input, service, &uri, permission)),

            ConversionState::GrantedParseHtmlPermission {
                input,
                service,
                position,
                url,
                retry,
            } => Some(self.parse_html(input, service, position, url, retry).await),

            ConversionState::DeniedParseHtmlPermission { input, position } => {
                Some(if position.has_coordinates() || position.has_query() {
                    ConversionState::ConversionSucceeded { position }
                } else {
                    ConversionState::ConversionFailed {
                        message: FailureMessage::ParseHtmlError,
                        input,
                    }
                })
            }

            ConversionState::GrantedParseWebPermission {
                input,
                service,
                position,
                url,
            } => self.parse_web(input, service, position, url).await,

            ConversionState::ConversionSucceeded { position } => {
                self.resolve_automation(position).await
            }

            ConversionState::ActionWaiting {
                position,
                action,
                delay,
            } => Some(match self.cancel.delay(delay).await {
                WaitOutcome::Completed => ConversionState::ActionReady { position, action },
                WaitOutcome::Cancelled => ConversionState::ActionFinished,
            }),

            ConversionState::ActionReady { position, action } => {
                Some(if action.needs_location() {
                    ConversionState::LocationRationaleRequested { position, action }
                } else {
                    ConversionState::BasicActionReady { position, action }
                })
            }

            ConversionState::LocationReceived {
                position,
                action,
                location,
            } => Some(match location {
                Some(location) => ConversionState::LocationActionReady {
                    position,
                    action,
                    location,
                },
                None => ConversionState::LocationFindingFailed,
            }),

            ConversionState::ActionRan { success } => Some(match success {
                None => ConversionState::ActionFinished,
                Some(true) => ConversionState::ActionSucceeded,
                Some(false) => ConversionState::ActionFailed,
            }),

            ConversionState::ActionSucceeded
            | ConversionState::ActionFailed
            | ConversionState::LocationFindingFailed => {
                // Cancelling the banner just finishes early.
                let _ = self.cancel.delay(self.timing.result_display_delay).await;
                Some(ConversionState::ActionFinished)
            }
        }
    }

    /// Drive a conversion from raw text until it parks or terminates.
    pub async fn run(&self, text: &str) -> ConversionState {
        self.run_from(ConversionState::received(text)).await
    }

    /// Drive transitions from an arbitrary state until the machine parks
    /// (terminal or awaiting external input).
    pub async fn run_from(&self, state: ConversionState) -> ConversionState {
        let mut state = state;
        loop {
            match self.transition(state.clone()).await {
                Some(next) => state = next,
                None => return state,
            }
        }
    }

    /// Answer a pending permission request positively.
    ///
    /// With `do_not_ask`, the answer is persisted as the standing `Always`
    /// preference. Returns `None` when `state` is not awaiting an answer.
    #[must_use]
    pub fn grant(&self, state: ConversionState, do_not_ask: bool) -> Option<ConversionState> {
        match state {
            ConversionState::RequestedUnshortenPermission {
                input,
                service,
                uri,
                short,
            } => {
                persist_decision(true, do_not_ask, self.prefs);
                Some(ConversionState::GrantedUnshortenPermission {
                    input,
                    service,
                    uri,
                    short,
                    retry: None,
                })
            }
            ConversionState::RequestedParseHtmlPermission {
                input,
                service,
                position,
                url,
                kind,
            } => {
                persist_decision(true, do_not_ask, self.prefs);
                Some(match kind {
                    HtmlParseKind::Html => ConversionState::GrantedParseHtmlPermission {
                        input,
                        service,
                        position,
                        url,
                        retry: None,
                    },
                    HtmlParseKind::Web => ConversionState::GrantedParseWebPermission {
                        input,
                        service,
                        position,
                        url,
                    },
                })
            }
            ConversionState::LocationRationaleShown { position, action } => {
                Some(ConversionState::LocationRationaleConfirmed { position, action })
            }
            _ => None,
        }
    }

    /// Answer a pending permission request negatively.
    ///
    /// With `do_not_ask`, the answer is persisted as the standing `Never`
    /// preference. Returns `None` when `state` is not awaiting an answer.
    #[must_use]
    pub fn deny(&self, state: ConversionState, do_not_ask: bool) -> Option<ConversionState> {
        match state {
            ConversionState::RequestedUnshortenPermission { input, .. } => {
                persist_decision(false, do_not_ask, self.prefs);
                Some(ConversionState::DeniedConnectionPermission { input })
            }
            ConversionState::RequestedParseHtmlPermission {
                input, position, ..
            } => {
                persist_decision(false, do_not_ask, self.prefs);
                Some(ConversionState::DeniedParseHtmlPermission { input, position })
            }
            ConversionState::LocationRationaleShown { .. } => {
                Some(ConversionState::ActionFinished)
            }
            _ => None,
        }
    }

    fn match_input_text(&self, input: String) -> ConversionState {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ConversionState::ConversionFailed {
                message: FailureMessage::MissingUrl,
                input,
            };
        }
        match geolink_inputs::match_input(trimmed) {
            Some((service, found)) => {
                let uri = Uri::parse(&found.matched);
                ConversionState::ReceivedUri {
                    input,
                    service: InputRef(service),
                    uri,
                    permission: None,
                }
            }
            None => ConversionState::ConversionFailed {
                message: FailureMessage::UnsupportedService,
                input,
            },
        }
    }

    fn check_short_uri(
        &self,
        input: String,
        service: InputRef,
        uri: Uri,
        permission: Option<Permission>,
    ) -> ConversionState {
        let Some(short) = service.short_uri(&uri) else {
            return ConversionState::UnshortenedUrl {
                input,
                service,
                uri,
                permission,
            };
        };
        match effective_permission(permission, self.prefs) {
            Permission::Always => ConversionState::GrantedUnshortenPermission {
                input,
                service,
                uri,
                short,
                retry: None,
            },
            Permission::Ask => ConversionState::RequestedUnshortenPermission {
                input,
                service,
                uri,
                short,
            },
            Permission::Never => ConversionState::DeniedConnectionPermission { input },
        }
    }

    /// Jittered back-off before a retry attempt. `Cancelled` here counts as
    /// cancelling the network phase.
    async fn retry_backoff(&self, retry: &Retry) -> WaitOutcome {
        let exponent = u32::from(retry.count.saturating_sub(1)).min(10);
        let base = self.timing.retry_backoff_base * 2u32.pow(exponent);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let jittered = Duration::from_millis(
            (base.as_millis() as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64,
        );
        self.cancel.delay(jittered).await
    }

    async fn unshorten(
        &self,
        input: String,
        service: InputRef,
        uri: Uri,
        short: ShortUri,
        retry: Option<Retry>,
    ) -> ConversionState {
        if let Some(r) = &retry {
            if self.retry_backoff(r).await == WaitOutcome::Cancelled {
                return ConversionState::ConversionFailed {
                    message: FailureMessage::Cancelled,
                    input,
                };
            }
        }

        let result = tokio::select! {
            () = self.cancel.cancelled() => Err(NetError::Cancelled),
            result = self.net.request_location_header(&short.url, probe_method(short.method)) => result,
        };

        match result {
            Ok(Some(target)) => {
                let resolved = resolve_against(&short.url, &target);
                tracing::debug!(service = service.id(), url = %resolved, "short link resolved");
                ConversionState::UnshortenedUrl {
                    input,
                    service,
                    uri: resolved,
                    permission: Some(Permission::Always),
                }
            }
            Ok(None) => ConversionState::ConversionFailed {
                message: FailureMessage::UnshortenError,
                input,
            },
            Err(error) => {
                if should_retry(&error, retry.as_ref()) {
                    if let Some(next) = next_retry(&error, retry.as_ref()) {
                        tracing::warn!(
                            service = service.id(),
                            attempt = next.count,
                            error = %error,
                            "transient unshorten failure; retrying"
                        );
                        return ConversionState::GrantedUnshortenPermission {
                            input,
                            service,
                            uri,
                            short,
                            retry: Some(next),
                        };
                    }
                }
                ConversionState::ConversionFailed {
                    message: unshorten_failure(&error),
                    input,
                }
            }
        }
    }

    fn parse_unshortened(
        &self,
        input: String,
        service: InputRef,
        uri: &Uri,
        permission: Option<Permission>,
    ) -> ConversionState {
        match service.parse_uri(uri) {
            ParseUriResult::Failed => ConversionState::ConversionFailed {
                message: FailureMessage::ParseUrlError,
                input,
            },
            ParseUriResult::Succeeded(position) => {
                if position.is_successful() {
                    ConversionState::ConversionSucceeded { position }
                } else {
                    ConversionState::ConversionFailed {
                        message: FailureMessage::ParseUrlError,
                        input,
                    }
                }
            }
            ParseUriResult::SucceededAndSupportsHtmlParsing(position, url) => {
                if !service.supports_html_parsing() {
                    return ConversionState::DeniedParseHtmlPermission { input, position };
                }
                self.gate_parse_fallback(input, service, position, url, HtmlParseKind::Html, permission)
            }
            ParseUriResult::SucceededAndSupportsWebParsing(position, url) => {
                if !service.supports_web_parsing() {
                    return ConversionState::DeniedParseHtmlPermission { input, position };
                }
                self.gate_parse_fallback(input, service, position, url, HtmlParseKind::Web, permission)
            }
        }
    }

    fn gate_parse_fallback(
        &self,
        input: String,
        service: InputRef,
        position: Position,
        url: String,
        kind: HtmlParseKind,
        permission: Option<Permission>,
    ) -> ConversionState {
        match effective_permission(permission, self.prefs) {
            Permission::Always => match kind {
                HtmlParseKind::Html => ConversionState::GrantedParseHtmlPermission {
                    input,
                    service,
                    position,
                    url,
                    retry: None,
                },
                HtmlParseKind::Web => ConversionState::GrantedParseWebPermission {
                    input,
                    service,
                    position,
                    url,
                },
            },
            Permission::Ask => ConversionState::RequestedParseHtmlPermission {
                input,
                service,
                position,
                url,
                kind,
            },
            Permission::Never => ConversionState::DeniedParseHtmlPermission { input, position },
        }
    }

    async fn parse_html(
        &self,
        input: String,
        service: InputRef,
        position: Position,
        url: String,
        retry: Option<Retry>,
    ) -> ConversionState {
        if let Some(r) = &retry {
            if self.retry_backoff(r).await == WaitOutcome::Cancelled {
                return ConversionState::ConversionFailed {
                    message: FailureMessage::Cancelled,
                    input,
                };
            }
        }

        let result = tokio::select! {
            () = self.cancel.cancelled() => Err(NetError::Cancelled),
            result = self.net.get_text(&url) => result,
        };

        match result {
            Ok(body) => match service.parse_html(&body, &position) {
                ParseHtmlResult::Succeeded(position) => {
                    ConversionState::ConversionSucceeded { position }
                }
                ParseHtmlResult::RequiresRedirect(target) => {
                    let resolved = resolve_against(&url, &target);
                    tracing::debug!(service = service.id(), url = %resolved, "page redirects");
                    ConversionState::ReceivedUri {
                        input,
                        service,
                        uri: resolved,
                        permission: Some(Permission::Always),
                    }
                }
                ParseHtmlResult::RequiresWebParsing(web_url) => {
                    if service.supports_web_parsing() {
                        ConversionState::GrantedParseWebPermission {
                            input,
                            service,
                            position,
                            url: web_url,
                        }
                    } else {
                        ConversionState::ConversionFailed {
                            message: FailureMessage::ParseHtmlError,
                            input,
                        }
                    }
                }
                ParseHtmlResult::Failed => {
                    ConversionState::DeniedParseHtmlPermission { input, position }
                }
            },
            Err(error) => {
                if should_retry(&error, retry.as_ref()) {
                    if let Some(next) = next_retry(&error, retry.as_ref()) {
                        tracing::warn!(
                            service = service.id(),
                            attempt = next.count,
                            error = %error,
                            "transient page fetch failure; retrying"
                        );
                        return ConversionState::GrantedParseHtmlPermission {
                            input,
                            service,
                            position,
                            url,
                            retry: Some(next),
                        };
                    }
                }
                ConversionState::ConversionFailed {
                    message: parse_html_failure(&error),
                    input,
                }
            }
        }
    }

    /// Web-render fallback: wait (bounded) for the page's URL to change
    /// into something parseable. Host cancellation leaves the state pending
    /// without a terminal result.
    async fn parse_web(
        &self,
        input: String,
        service: InputRef,
        _position: Position,
        url: String,
    ) -> Option<ConversionState> {
        let Some(web) = self.web else {
            return Some(ConversionState::ConversionFailed {
                message: FailureMessage::ParseHtmlError,
                input,
            });
        };

        let mut changes = web.open(&url);
        let change = tokio::select! {
            () = self.cancel.cancelled() => return None,
            () = tokio::time::sleep(self.timing.web_timeout) => None,
            change = changes.recv() => change,
        };

        let failed = ConversionState::ConversionFailed {
            message: FailureMessage::ParseHtmlError,
            input,
        };
        let Some(new_url) = change else {
            return Some(failed);
        };
        match service.parse_uri(&Uri::parse(&new_url)) {
            ParseUriResult::Succeeded(position)
            | ParseUriResult::SucceededAndSupportsHtmlParsing(position, _)
            | ParseUriResult::SucceededAndSupportsWebParsing(position, _) => {
                if position.is_successful() {
                    Some(ConversionState::ConversionSucceeded { position })
                } else {
                    Some(failed)
                }
            }
            ParseUriResult::Failed => Some(failed),
        }
    }

    /// Pick the automation follow-up for a successful conversion, gated by
    /// the billing entitlement.
    async fn resolve_automation(&self, position: Position) -> Option<ConversionState> {
        let action = self.prefs.automation();
        if action == Automation::Noop {
            return None;
        }
        if action.requires_entitlement() && !self.entitled().await {
            tracing::debug!("automation configured but entitlement absent; leaving manual UI");
            return None;
        }
        match action.pre_delay(self.prefs.automation_delay()) {
            Some(delay) => Some(ConversionState::ActionWaiting {
                position,
                action,
                delay,
            }),
            None => Some(ConversionState::ActionReady { position, action }),
        }
    }

    /// Resolve the entitlement, waiting out an in-flight billing refresh.
    ///
    /// While the stream reports `Loading`, the first *purchased* value to
    /// arrive inside the window wins; other emissions are ignored. On
    /// timeout (or a closed stream) the cached last-known product id is the
    /// synchronous fallback.
    async fn entitled(&self) -> bool {
        let mut rx = self.billing.status();
        let current = rx.borrow().clone();
        match current {
            BillingStatus::Purchased(_) | BillingStatus::Done { .. } => {
                if let Some(product) = current.purchased_product() {
                    self.prefs.set_cached_product_id(product);
                }
                true
            }
            BillingStatus::NotPurchased => false,
            BillingStatus::Loading => {
                let deadline = tokio::time::sleep(self.timing.billing_wait);
                tokio::pin!(deadline);
                loop {
                    tokio::select! {
                        () = &mut deadline => {
                            break self.prefs.cached_product_id().is_some();
                        }
                        changed = rx.changed() => {
                            if changed.is_err() {
                                break self.prefs.cached_product_id().is_some();
                            }
                            let status = rx.borrow_and_update().clone();
                            if let Some(product) = status.purchased_product() {
                                self.prefs.set_cached_product_id(product);
                                break true;
                            }
                        }
                    }
                }
            }
        }
    }
}
