//! End-to-end conversion scenarios with wiremock standing in for every
//! network peer.
//!
//! The `UrlClient` is pointed at the mock server via `with_base_url`, so
//! short-link hosts like `maps.app.goo.gl` resolve against the mock while
//! the engine sees the real URLs.

use std::time::Duration;

use geolink_core::{Permission, Position};
use geolink_engine::{
    cancellation, Automation, BillingStatus, ConversionState, Engine, FailureMessage,
    InMemoryPreferences, PreferenceStore, StaticBilling, Timing, WebRenderer,
};
use geolink_net::{UrlClient, UrlClientConfig};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_timing() -> Timing {
    Timing {
        result_display_delay: Duration::from_millis(10),
        billing_wait: Duration::from_millis(100),
        web_timeout: Duration::from_millis(200),
        retry_backoff_base: Duration::from_millis(1),
    }
}

fn mocked_client(server: &MockServer) -> UrlClient {
    UrlClient::with_base_url(
        &UrlClientConfig {
            request_timeout_secs: 1,
            connect_timeout_secs: 1,
            user_agent: "geolink-test/0.1".to_owned(),
        },
        &server.uri(),
    )
    .expect("client construction should not fail")
}

fn offline_client() -> UrlClient {
    // Points at a closed port; any accidental network use fails loudly.
    UrlClient::with_base_url(
        &UrlClientConfig {
            request_timeout_secs: 1,
            connect_timeout_secs: 1,
            user_agent: "geolink-test/0.1".to_owned(),
        },
        "http://127.0.0.1:9",
    )
    .expect("client construction should not fail")
}

fn not_purchased() -> StaticBilling {
    StaticBilling::new(BillingStatus::NotPurchased)
}

fn purchased() -> StaticBilling {
    StaticBilling::new(BillingStatus::Purchased("automation".to_owned()))
}

// ---------------------------------------------------------------------------
// Literal end-to-end scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_google_link_resolves_to_embedded_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/TmbeHMiLEfTBws9EA"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "Location",
            "https://www.google.com/maps/place/Pia%C8%9Ba+Romana/data=!4m6!3m5!1s0x0:0x0!8m2!3d44.4490541!4d26.0888398",
        ))
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Always);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine.run("https://maps.app.goo.gl/TmbeHMiLEfTBws9EA").await;
    let position = state.position().expect("conversion should succeed");
    assert_eq!(position.to_geo_uri(), "geo:44.4490541,26.0888398");
}

#[tokio::test]
async fn geo_uri_produces_received_uri_synchronously_without_network() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let next = engine
        .transition(ConversionState::received("geo:1,2?q="))
        .await
        .expect("text should match");
    let ConversionState::ReceivedUri { service, uri, .. } = &next else {
        panic!("expected ReceivedUri, got {next:?}");
    };
    assert_eq!(service.id(), "geo");
    assert_eq!(uri.to_string(), "geo:1,2?q=");

    // The rest of the flow also stays offline.
    let state = engine.run("geo:1,2?q=").await;
    assert_eq!(state.position().unwrap().to_geo_uri(), "geo:1,2");
}

#[tokio::test]
async fn empty_input_fails_with_missing_url() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine.run("").await;
    assert_eq!(state.failure(), Some((FailureMessage::MissingUrl, "")));
}

#[tokio::test]
async fn apple_ll_link_converts_without_network() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine.run("https://maps.apple.com/?ll=50.894967,4.341626").await;
    assert_eq!(
        state.position().unwrap().to_geo_uri(),
        "geo:50.894967,4.341626"
    );
}

#[tokio::test]
async fn one_timeout_then_success_recovers_via_retry() {
    let server = MockServer::start().await;
    // First probe times out (client timeout is 1s), the second succeeds.
    Mock::given(method("HEAD"))
        .and(path("/Short1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "https://www.google.com/maps/@1.5,2.5,8z")
                .set_delay(Duration::from_secs(5)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/Short1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "https://www.google.com/maps/@1.5,2.5,8z"),
        )
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Always);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let received = engine
        .transition(ConversionState::received("https://maps.app.goo.gl/Short1"))
        .await
        .unwrap();
    let granted = engine.transition(received).await.unwrap();
    assert!(
        matches!(granted, ConversionState::GrantedUnshortenPermission { retry: None, .. }),
        "standing Always permission grants immediately: {granted:?}"
    );

    let retrying = engine.transition(granted).await.unwrap();
    let ConversionState::GrantedUnshortenPermission {
        retry: Some(retry), ..
    } = &retrying
    else {
        panic!("timeout should re-emit the granted state with a retry, got {retrying:?}");
    };
    assert_eq!(retry.count, 1);

    let resolved = engine.transition(retrying).await.unwrap();
    assert!(
        matches!(resolved, ConversionState::UnshortenedUrl { .. }),
        "retry 1 must recover to UnshortenedUrl, got {resolved:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn action_waiting_cancelled_mid_wait_skips_to_finished() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = purchased();
    let (handle, token) = cancellation();
    let engine = Engine::new(&client, &prefs, &billing)
        .with_timing(test_timing())
        .with_cancel_token(token);

    let waiting = ConversionState::ActionWaiting {
        position: Position::from_lat_lon("1.5", "2.5"),
        action: Automation::ShareGeoUri,
        delay: Duration::from_secs(3),
    };

    let (next, ()) = tokio::join!(engine.transition(waiting), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
    });
    assert_eq!(next, Some(ConversionState::ActionFinished));
}

// ---------------------------------------------------------------------------
// Permission gating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ask_permission_parks_until_granted() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "https://www.google.com/maps/@9.5,8.5,7z"),
        )
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let parked = engine.run("https://maps.app.goo.gl/AskMe").await;
    assert!(
        matches!(parked, ConversionState::RequestedUnshortenPermission { .. }),
        "default Ask must park: {parked:?}"
    );
    assert!(parked.awaits_external_input());

    let granted = engine.grant(parked, true).expect("grant applies");
    assert_eq!(
        prefs.connection_permission(),
        Some(Permission::Always),
        "do-not-ask persists the answer"
    );

    let mut state = granted;
    loop {
        match engine.transition(state.clone()).await {
            Some(next) => state = next,
            None => break,
        }
    }
    assert!(state.position().is_some(), "flow completes: {state:?}");
}

#[tokio::test]
async fn denied_permission_fails_with_permission_message() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let parked = engine.run("https://maps.app.goo.gl/AskMe").await;
    let denied = engine.deny(parked, true).expect("deny applies");
    assert_eq!(prefs.connection_permission(), Some(Permission::Never));

    let failed = engine.transition(denied).await.unwrap();
    assert!(matches!(
        failed.failure(),
        Some((FailureMessage::ConnectionPermissionDenied, _))
    ));
}

#[tokio::test]
async fn standing_never_denies_without_asking() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Never);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine.run("https://maps.app.goo.gl/NoAsk").await;
    assert!(matches!(
        state.failure(),
        Some((FailureMessage::ConnectionPermissionDenied, _))
    ));
}

// ---------------------------------------------------------------------------
// HTML fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn place_page_html_upgrades_query_to_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r"<html><script>APP=['!3d44.4490541!4d26.0888398']</script></html>",
        ))
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Always);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine
        .run("https://www.google.com/maps/place/Pia%C8%9Ba+Romana")
        .await;
    let position = state.position().expect("should succeed");
    assert_eq!(position.lat.as_deref(), Some("44.4490541"));
    assert_eq!(position.q.as_deref(), Some("Piața Romana"));
}

#[tokio::test]
async fn unparseable_html_salvages_the_query_position() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>opaque shell</html>"))
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Always);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine
        .run("https://www.google.com/maps/place/Somewhere+Nice")
        .await;
    let position = state.position().expect("query-only success");
    assert!(!position.has_coordinates());
    assert_eq!(position.q.as_deref(), Some("Somewhere Nice"));
}

#[tokio::test]
async fn meta_refresh_redirect_re_enters_the_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/place/Redirecting"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<meta http-equiv="refresh" content="0;url=https://www.google.com/maps?q=1.5,2.5"/>"#,
        ))
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Always);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine
        .run("https://www.google.com/maps/place/Redirecting")
        .await;
    assert_eq!(state.position().unwrap().to_geo_uri(), "geo:1.5,2.5");
}

#[tokio::test]
async fn html_parse_denied_without_coordinates_or_query_fails() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let denied = ConversionState::DeniedParseHtmlPermission {
        input: "x".to_owned(),
        position: Position::default(),
    };
    let failed = engine.transition(denied).await.unwrap();
    assert!(matches!(
        failed.failure(),
        Some((FailureMessage::ParseHtmlError, _))
    ));
}

// ---------------------------------------------------------------------------
// Retry exhaustion and error classes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_timeouts_exhaust_retries_into_connection_failure() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "https://www.google.com/maps/@1.5,2.5,8z")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Always);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine.run("https://maps.app.goo.gl/AlwaysSlow").await;
    assert!(
        matches!(
            state.failure(),
            Some((FailureMessage::UnshortenConnectionError, _))
        ),
        "exhausted timeouts map to the connection variant: {state:?}"
    );
}

#[tokio::test]
async fn not_found_short_link_fails_immediately_with_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = mocked_client(&server);
    let prefs = InMemoryPreferences::new().with_connection_permission(Permission::Always);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine.run("https://maps.app.goo.gl/Gone404").await;
    assert!(matches!(
        state.failure(),
        Some((FailureMessage::UnshortenError, _))
    ));
}

#[tokio::test]
async fn unsupported_text_fails_without_network() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = engine.run("https://example.com/nothing/to/see").await;
    assert!(matches!(
        state.failure(),
        Some((FailureMessage::UnsupportedService, _))
    ));
}

// ---------------------------------------------------------------------------
// Automation and billing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn noop_automation_stops_at_success() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    assert_eq!(engine.transition(succeeded).await, None);
}

#[tokio::test]
async fn paid_action_without_entitlement_stays_manual() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new().with_automation(Automation::Copy);
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    assert_eq!(engine.transition(succeeded).await, None);
}

#[tokio::test]
async fn copy_action_with_entitlement_is_ready_immediately() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new().with_automation(Automation::Copy);
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    let next = engine.transition(succeeded).await.unwrap();
    assert!(matches!(
        next,
        ConversionState::ActionReady {
            action: Automation::Copy,
            ..
        }
    ));
}

#[tokio::test]
async fn share_action_counts_down_before_running() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new()
        .with_automation(Automation::ShareGeoUri)
        .with_automation_delay(Duration::from_millis(20));
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    let waiting = engine.transition(succeeded).await.unwrap();
    let ConversionState::ActionWaiting { delay, .. } = &waiting else {
        panic!("share gets a countdown, got {waiting:?}");
    };
    assert_eq!(*delay, Duration::from_millis(20));

    let ready = engine.transition(waiting).await.unwrap();
    let basic = engine.transition(ready).await.unwrap();
    assert!(matches!(basic, ConversionState::BasicActionReady { .. }));
    assert_eq!(engine.transition(basic).await, None, "host executes from here");
}

#[tokio::test]
async fn loading_billing_settles_when_purchase_arrives_in_window() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new().with_automation(Automation::Copy);
    let billing = StaticBilling::new(BillingStatus::Loading);
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    let (next, ()) = tokio::join!(engine.transition(succeeded), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        billing.publish(BillingStatus::Purchased("automation".to_owned()));
    });
    assert!(matches!(next, Some(ConversionState::ActionReady { .. })));
    assert_eq!(
        prefs.cached_product_id(),
        Some("automation".to_owned()),
        "observed purchase refreshes the cache"
    );
}

#[tokio::test]
async fn loading_billing_ignores_non_purchased_emissions_until_timeout() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new().with_automation(Automation::Copy);
    let billing = StaticBilling::new(BillingStatus::Loading);
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    let (next, ()) = tokio::join!(engine.transition(succeeded), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        billing.publish(BillingStatus::Loading);
    });
    assert_eq!(next, None, "no purchase inside the window, no cache: manual");
}

#[tokio::test]
async fn loading_billing_falls_back_to_cached_product_on_timeout() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new().with_automation(Automation::Copy);
    prefs.set_cached_product_id("automation");
    let billing = StaticBilling::new(BillingStatus::Loading);
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    let next = engine.transition(succeeded).await;
    assert!(matches!(next, Some(ConversionState::ActionReady { .. })));
}

// ---------------------------------------------------------------------------
// Web-render fallback
// ---------------------------------------------------------------------------

struct ScriptedRenderer {
    urls: Vec<String>,
}

impl WebRenderer for ScriptedRenderer {
    fn open(&self, _url: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(8);
        let urls = self.urls.clone();
        tokio::spawn(async move {
            for url in urls {
                tokio::time::sleep(Duration::from_millis(5)).await;
                if tx.send(url).await.is_err() {
                    return;
                }
            }
        });
        rx
    }
}

fn web_state(input: &str, url: &str) -> ConversionState {
    let (service, _) = geolink_inputs::match_input(input).expect("input matches");
    ConversionState::GrantedParseWebPermission {
        input: input.to_owned(),
        service: geolink_engine::InputRef(service),
        position: Position::from_query("pending"),
        url: url.to_owned(),
    }
}

#[tokio::test]
async fn web_render_url_change_completes_the_conversion() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let renderer = ScriptedRenderer {
        urls: vec!["https://www.google.com/maps/@7.5,8.5,12z".to_owned()],
    };
    let engine = Engine::new(&client, &prefs, &billing)
        .with_timing(test_timing())
        .with_web_renderer(&renderer);

    let state = web_state(
        "https://www.google.com/maps/place/X",
        "https://www.google.com/maps/place/X",
    );
    let next = engine.transition(state).await.unwrap();
    assert_eq!(next.position().unwrap().to_geo_uri(), "geo:7.5,8.5?z=12");
}

#[tokio::test]
async fn web_render_timeout_fails_the_conversion() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let renderer = ScriptedRenderer { urls: vec![] };
    let engine = Engine::new(&client, &prefs, &billing)
        .with_timing(test_timing())
        .with_web_renderer(&renderer);

    let state = web_state(
        "https://www.google.com/maps/place/X",
        "https://www.google.com/maps/place/X",
    );
    let next = engine.transition(state).await.unwrap();
    assert!(matches!(
        next.failure(),
        Some((FailureMessage::ParseHtmlError, _))
    ));
}

#[tokio::test]
async fn web_render_cancellation_leaves_no_terminal_state() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let renderer = ScriptedRenderer { urls: vec![] };
    let (handle, token) = cancellation();
    let engine = Engine::new(&client, &prefs, &billing)
        .with_timing(Timing {
            web_timeout: Duration::from_secs(30),
            ..test_timing()
        })
        .with_web_renderer(&renderer)
        .with_cancel_token(token);

    let state = web_state(
        "https://www.google.com/maps/place/X",
        "https://www.google.com/maps/place/X",
    );
    let (next, ()) = tokio::join!(engine.transition(state), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
    });
    assert_eq!(next, None, "cancelled web wait stays pending");
}

#[tokio::test]
async fn missing_web_renderer_fails_web_parsing() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = web_state(
        "https://www.google.com/maps/place/X",
        "https://www.google.com/maps/place/X",
    );
    let next = engine.transition(state).await.unwrap();
    assert!(next.failure().is_some());
}

// ---------------------------------------------------------------------------
// Action feedback and the location sub-graph
// ---------------------------------------------------------------------------

#[tokio::test]
async fn action_ran_success_path_finishes_after_display_delay() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let basic = ConversionState::BasicActionReady {
        position: Position::from_lat_lon("1.5", "2.5"),
        action: Automation::Copy,
    };
    assert_eq!(engine.transition(basic.clone()).await, None);

    let ran = basic.action_ran(Some(true)).unwrap();
    let succeeded = engine.transition(ran).await.unwrap();
    assert_eq!(succeeded, ConversionState::ActionSucceeded);
    let finished = engine.transition(succeeded).await.unwrap();
    assert_eq!(finished, ConversionState::ActionFinished);
}

#[tokio::test]
async fn action_ran_failure_path_reports_then_finishes() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let ran = ConversionState::ActionRan {
        success: Some(false),
    };
    let failed = engine.transition(ran).await.unwrap();
    assert_eq!(failed, ConversionState::ActionFailed);
    assert_eq!(
        engine.transition(failed).await,
        Some(ConversionState::ActionFinished)
    );
}

#[tokio::test]
async fn location_action_walks_the_rationale_graph() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new()
        .with_automation(Automation::ShareLiveLocation)
        .with_automation_delay(Duration::ZERO);
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let succeeded = ConversionState::ConversionSucceeded {
        position: Position::from_lat_lon("1.5", "2.5"),
    };
    let ready = engine.transition(succeeded).await.unwrap();
    let requested = engine.transition(ready).await.unwrap();
    assert!(matches!(
        requested,
        ConversionState::LocationRationaleRequested { .. }
    ));
    assert_eq!(engine.transition(requested.clone()).await, None);

    let shown = requested.rationale_shown().unwrap();
    let confirmed = engine.grant(shown, false).unwrap();
    let permission_received = confirmed.location_permission_received().unwrap();
    let received = permission_received
        .location_received(Some(geolink_core::position::Point::new("50.0", "4.0")))
        .unwrap();
    let ready = engine.transition(received).await.unwrap();
    let ConversionState::LocationActionReady { location, .. } = &ready else {
        panic!("expected LocationActionReady, got {ready:?}");
    };
    assert_eq!(location.lat, "50.0");
}

#[tokio::test]
async fn denied_rationale_skips_the_action() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let shown = ConversionState::LocationRationaleShown {
        position: Position::from_lat_lon("1.5", "2.5"),
        action: Automation::ShareLiveLocation,
    };
    assert_eq!(
        engine.deny(shown, false),
        Some(ConversionState::ActionFinished)
    );
}

#[tokio::test]
async fn missing_location_reports_finding_failure_then_finishes() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let received = ConversionState::LocationReceived {
        position: Position::from_lat_lon("1.5", "2.5"),
        action: Automation::ShareLiveLocation,
        location: None,
    };
    let failed = engine.transition(received).await.unwrap();
    assert_eq!(failed, ConversionState::LocationFindingFailed);
    assert_eq!(
        engine.transition(failed).await,
        Some(ConversionState::ActionFinished)
    );
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[tokio::test]
async fn equal_states_with_equal_responses_transition_equally() {
    let client = offline_client();
    let prefs = InMemoryPreferences::new();
    let billing = not_purchased();
    let engine = Engine::new(&client, &prefs, &billing).with_timing(test_timing());

    let state = ConversionState::received("https://maps.apple.com/?ll=50.894967,4.341626");
    let a = engine.transition(state.clone()).await;
    let b = engine.transition(state).await;
    assert_eq!(a, b);

    let next = a.unwrap();
    let a2 = engine.transition(next.clone()).await;
    let b2 = engine.transition(next).await;
    assert_eq!(a2, b2);
}
