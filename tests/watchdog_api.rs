// Integration tests for the watchdog client and lifecycle controller.

use std::net::TcpListener;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use syncthing_monitor::config::StartPolicy;
use syncthing_monitor::types::MonitorError;
use syncthing_monitor::watchdog::{
    Detection, LifecycleController, WatchdogClient, WatchdogState, UNKNOWN_START_DETAILS,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn client_for(uri: &str) -> WatchdogClient {
    WatchdogClient::new(format!("{uri}/"), Duration::from_secs(2))
        .unwrap()
        .with_retry_delay(Duration::from_millis(300))
}

async fn setup() -> (MockServer, WatchdogClient) {
    let server = MockServer::start().await;
    let client = client_for(&server.uri());
    (server, client)
}

fn controller(client: WatchdogClient, max_attempts: u32) -> LifecycleController {
    let policy = StartPolicy {
        max_attempts,
        poll_interval: Duration::from_millis(10),
        settle_delay: Duration::from_millis(10),
    };
    LifecycleController::new(client, policy)
}

async fn mount_state(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/__decky-watchdog/state"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_post(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

// ── State ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_state_is_trimmed_and_parsed() {
    let (server, client) = setup().await;
    mount_state(&server, "running\n").await;

    assert_eq!(client.get_state().await.unwrap(), WatchdogState::Running);
}

#[tokio::test]
async fn test_unknown_state_text_is_an_error() {
    let (server, client) = setup().await;
    mount_state(&server, "launching").await;

    let err = client.get_state().await.unwrap_err();
    assert!(matches!(err, MonitorError::UnexpectedState(ref s) if s == "launching"));
}

#[tokio::test]
async fn test_http_error_on_state_is_not_retried() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/__decky-watchdog/state"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_state().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_state_retries_once_after_connection_failure() {
    // Reserve a port, release it, and only start listening after the first attempt.
    let reserved = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = reserved.local_addr().unwrap();
    drop(reserved);

    let client = client_for(&format!("http://{addr}"));
    let late_server = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let listener = TcpListener::bind(addr).unwrap();
        let server = MockServer::builder().listener(listener).start().await;
        mount_state(&server, "wait").await;
        server
    });

    let state = client.get_state().await.unwrap();
    assert_eq!(state, WatchdogState::Wait);
    drop(late_server.await.unwrap());
}

#[tokio::test]
async fn test_state_gives_up_after_second_connection_failure() {
    let client = client_for("http://127.0.0.1:1");

    let started = Instant::now();
    let err = client.get_state().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_unreachable(), "unexpected error: {err:?}");
    // exactly one retry: one delay waited, never two
    assert!(elapsed >= Duration::from_millis(300), "no retry: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "retried more than once: {elapsed:?}");
}

// ── Probes and checks ───────────────────────────────────────────────

#[tokio::test]
async fn test_check_if_up_is_tri_state() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(425))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .with_priority(2)
        .mount(&server)
        .await;
    mount_post(&server, "/", ResponseTemplate::new(502).set_body_string("bad gateway")).await;

    assert!(!client.check_if_up().await.unwrap());
    assert!(client.check_if_up().await.unwrap());
    let err = client.check_if_up().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_detection_outcomes() {
    let (server, client) = setup().await;

    mount_post(
        &server,
        "/__decky-watchdog/check/scan_port",
        ResponseTemplate::new(200).set_body_json(json!({ "port": 8384 })),
    )
    .await;
    mount_post(
        &server,
        "/__decky-watchdog/check/scan_api_key",
        ResponseTemplate::new(500).set_body_json(json!({ "error": "config.xml not found" })),
    )
    .await;
    mount_post(
        &server,
        "/__decky-watchdog/check/scan_basic_auth",
        ResponseTemplate::new(404).set_body_string("not found"),
    )
    .await;

    assert_eq!(client.check_scan_port().await.unwrap(), Detection::Found(8384));
    // a failed scan is reported apart from a scan that found nothing
    assert_eq!(
        client.check_scan_apikey().await.unwrap(),
        Detection::Failed {
            error: "config.xml not found".into()
        }
    );
    // the call itself failing is an error, not "nothing found"
    let err = client.check_scan_basic_auth().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_check_start_surfaces_reported_failure() {
    let (server, client) = setup().await;
    mount_post(
        &server,
        "/__decky-watchdog/check/start",
        ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Syncthing binary not found",
        })),
    )
    .await;

    match client.check_start().await.unwrap_err() {
        MonitorError::StartFailed { error, details } => {
            assert_eq!(error, "Syncthing binary not found");
            assert_eq!(details.as_deref(), Some(UNKNOWN_START_DETAILS));
        }
        other => panic!("expected StartFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_setup_check_reloads_then_checks() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/__decky-watchdog/reload-config"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_post(
        &server,
        "/__decky-watchdog/check/start",
        ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
    )
    .await;

    controller(client, 3).setup_check().await.unwrap();
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_polls_until_up() {
    let (server, client) = setup().await;
    mount_post(&server, "/__decky-watchdog/start", ResponseTemplate::new(200)).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(425))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_post(&server, "/", ResponseTemplate::new(200)).await;

    let controller = controller(client, 5);
    let mut states = controller.subscribe();

    controller.start().await.unwrap();
    assert_eq!(controller.state(), WatchdogState::Running);
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), WatchdogState::Running);
}

#[tokio::test]
async fn test_start_times_out_when_always_too_early() {
    let (server, client) = setup().await;
    mount_post(&server, "/__decky-watchdog/start", ResponseTemplate::new(200)).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(425))
        .expect(3)
        .mount(&server)
        .await;

    let controller = controller(client, 3);
    let err = controller.start().await.unwrap_err();
    assert!(matches!(err, MonitorError::Timeout { attempts: 3 }));
    assert_eq!(controller.state(), WatchdogState::Unknown);
}

#[tokio::test]
async fn test_start_aborts_on_server_error() {
    let (server, client) = setup().await;
    mount_post(&server, "/__decky-watchdog/start", ResponseTemplate::new(200)).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("syncthing crashed"))
        .expect(1)
        .mount(&server)
        .await;

    let err = controller(client, 10).start().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_overlapping_start_is_refused() {
    let (server, client) = setup().await;
    mount_post(
        &server,
        "/__decky-watchdog/start",
        ResponseTemplate::new(200).set_delay(Duration::from_millis(200)),
    )
    .await;
    mount_post(&server, "/", ResponseTemplate::new(200)).await;

    let controller = controller(client, 3);
    let (first, second) = tokio::join!(controller.start(), controller.start());

    assert!(first.is_ok());
    assert!(matches!(second, Err(MonitorError::TransitionInFlight)));
}

#[tokio::test]
async fn test_cancel_stops_polling() {
    let (server, client) = setup().await;
    mount_post(&server, "/__decky-watchdog/start", ResponseTemplate::new(200)).await;
    mount_post(&server, "/", ResponseTemplate::new(425)).await;

    let controller = controller(client, 1000);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = controller.start_with_cancel(&cancel).await.unwrap_err();
    assert!(matches!(err, MonitorError::Cancelled));
    assert_eq!(controller.state(), WatchdogState::Unknown);

    // the guard is released, a new transition may begin
    mount_post(&server, "/__decky-watchdog/stop", ResponseTemplate::new(200)).await;
    mount_state(&server, "stopped").await;
    assert_eq!(controller.stop().await.unwrap(), WatchdogState::Stopped);
}

#[tokio::test]
async fn test_dropped_start_publishes_unknown() {
    let (server, client) = setup().await;
    mount_post(&server, "/__decky-watchdog/start", ResponseTemplate::new(200)).await;
    mount_post(&server, "/", ResponseTemplate::new(425)).await;

    let controller = controller(client, 1000);
    let abandoned = tokio::time::timeout(Duration::from_millis(50), controller.start()).await;

    assert!(abandoned.is_err());
    assert_eq!(controller.state(), WatchdogState::Unknown);
    // the in-flight flag was released along with the future
    mount_post(&server, "/__decky-watchdog/stop", ResponseTemplate::new(200)).await;
    mount_state(&server, "stopped").await;
    assert_eq!(controller.stop().await.unwrap(), WatchdogState::Stopped);
}

#[tokio::test]
async fn test_toggle_stops_a_running_daemon() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/__decky-watchdog/state"))
        .respond_with(ResponseTemplate::new(200).set_body_string("running"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_state(&server, "stopped").await;
    Mock::given(method("POST"))
        .and(path("/__decky-watchdog/stop"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller(client, 3);
    assert_eq!(controller.toggle().await.unwrap(), WatchdogState::Stopped);
    assert_eq!(controller.state(), WatchdogState::Stopped);
}
