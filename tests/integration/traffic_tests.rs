//! Integration tests for the traffic engine
//!
//! These tests use wiremock to create mock HTTP servers and run the engine
//! end-to-end against them.

use mock_traffic::config::{parse_config, Config, ConfigFormat};
use mock_traffic::crawler::{generate_traffic, Engine};
use mock_traffic::output::{ChannelObserver, NullObserver};
use mock_traffic::state::{EngineState, SchedulerState, StopReason};
use mock_traffic::TrafficError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration
fn create_test_config(
    root_urls: Vec<String>,
    blacklist: &[&str],
    min_sleep: u64,
    max_sleep: u64,
    timeout: u64,
) -> Config {
    Config {
        seed_urls: root_urls,
        blacklist: blacklist.iter().map(|s| s.to_string()).collect(),
        max_depth: 1,
        min_delay_ms: min_sleep,
        max_delay_ms: max_sleep,
        request_timeout_ms: timeout,
    }
}

fn html_page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// Polls `condition` until it holds, failing the test after ten seconds
async fn wait_until<F: Fn() -> bool>(condition: F, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "Timed out waiting for {}", what);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Mounts `/a` linking to `/b` and `/c`. `/b` and `/c` must never be fetched.
///
/// The response to `/a` is delayed so the scheduler finds the frontier empty
/// before the links arrive and the run ends after exactly one visit.
async fn mount_a_links_to_b_and_c(mock_server: &MockServer) {
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            html_page(format!(
                r#"<a href="{0}/b">B</a><a href="{0}/c">C</a>"#,
                base_url
            ))
            .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(mock_server)
        .await;

    for unvisited in ["/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(unvisited))
            .respond_with(html_page(String::new()))
            .expect(0)
            .mount(mock_server)
            .await;
    }
}

#[tokio::test]
async fn test_single_visit_extends_frontier() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_a_links_to_b_and_c(&mock_server).await;

    // Same shape as a config.json, with the mock server spliced in
    let config = parse_config(
        &format!(
            r#"{{
                "root_urls": ["{}/a"],
                "blacklisted_urls": [],
                "max_depth": 1,
                "min_sleep": 0,
                "max_sleep": 0
            }}"#,
            base_url
        ),
        ConfigFormat::Json,
    )
    .expect("Failed to parse config");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine =
        Engine::new(config, Arc::new(ChannelObserver::new(tx))).expect("Failed to create engine");

    assert_eq!(engine.start(), EngineState::Running);
    assert_eq!(engine.wait().await, Some(StopReason::FrontierExhausted));
    assert_eq!(engine.state(), EngineState::Stopped);

    // The in-flight visit still completes after the loop ended
    let count = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("No stats update received");
    assert_eq!(count, Some(1));

    let frontier = engine.frontier().clone();
    wait_until(|| frontier.len() == 2, "links to reach the frontier").await;

    assert_eq!(engine.stats().request_count(), 1);
    let pending: HashSet<String> = engine.frontier().snapshot().into_iter().collect();
    let expected: HashSet<String> = [format!("{}/b", base_url), format!("{}/c", base_url)]
        .into_iter()
        .collect();
    assert_eq!(pending, expected);
}

#[tokio::test]
async fn test_blacklisted_links_are_not_admitted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_a_links_to_b_and_c(&mock_server).await;

    let config = create_test_config(vec![format!("{}/a", base_url)], &["c"], 0, 0, 10_000);
    let mut engine = Engine::new(config, Arc::new(NullObserver)).expect("Failed to create engine");

    assert_eq!(engine.start(), EngineState::Running);
    engine.wait().await;

    let stats = engine.stats().clone();
    wait_until(|| stats.request_count() == 1, "the visit to complete").await;
    let frontier = engine.frontier().clone();
    wait_until(|| !frontier.is_empty(), "links to reach the frontier").await;

    assert_eq!(engine.frontier().snapshot(), vec![format!("{}/b", base_url)]);
}

#[tokio::test]
async fn test_empty_root_urls_never_runs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_page(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(vec![], &[], 0, 0, 10_000);
    let mut engine = Engine::new(config, Arc::new(NullObserver)).expect("Failed to create engine");

    assert_eq!(engine.start(), EngineState::Stopped);
    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.scheduler_state(), SchedulerState::Stopped);
    assert_eq!(engine.stats().request_count(), 0);
    assert_eq!(engine.wait().await, None);
    assert_eq!(engine.stop().await, None);

    let config = create_test_config(vec![], &[], 0, 0, 10_000);
    let reason = generate_traffic(config, Arc::new(NullObserver))
        .await
        .expect("Failed to run");
    assert_eq!(reason, None);
}

#[tokio::test]
async fn test_timeout_is_transport_failure_and_traffic_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page(String::new()).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(html_page(String::new()))
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        vec![format!("{}/slow", base_url), format!("{}/fast", base_url)],
        &[],
        0,
        0,
        200,
    );
    let mut engine = Engine::new(config, Arc::new(NullObserver)).expect("Failed to create engine");

    assert_eq!(engine.start(), EngineState::Running);
    // Whichever URL was picked first, the loop went on to the other one
    assert_eq!(engine.wait().await, Some(StopReason::FrontierExhausted));

    let stats = engine.stats().clone();
    wait_until(
        || stats.request_count() + stats.failure_count() == 2,
        "both visits to complete",
    )
    .await;

    assert_eq!(engine.stats().request_count(), 1);
    assert_eq!(engine.stats().failure_count(), 1);
    assert!(engine.frontier().is_empty());
}

#[tokio::test]
async fn test_http_failures_are_dropped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(format!(
            r#"<a href="{}/never">Never followed</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_page(String::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        vec![
            format!("{}/missing", base_url),
            format!("{}/broken", base_url),
            format!("{}/ok", base_url),
        ],
        &[],
        0,
        0,
        10_000,
    );
    let mut engine = Engine::new(config, Arc::new(NullObserver)).expect("Failed to create engine");

    engine.start();
    engine.wait().await;

    let stats = engine.stats().clone();
    wait_until(
        || stats.request_count() + stats.failure_count() == 3,
        "all visits to complete",
    )
    .await;

    assert_eq!(engine.stats().request_count(), 1);
    assert_eq!(engine.stats().failure_count(), 2);
    // Neither the failed URLs nor links from error pages come back
    assert!(engine.frontier().is_empty());
}

#[tokio::test]
async fn test_observer_sees_every_success_in_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="{}/p{}">Page {}</a>"#, base_url, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/hub"))
        .respond_with(html_page(links))
        .expect(1)
        .mount(&mock_server)
        .await;

    for i in 1..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html_page("leaf".to_string()))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(vec![format!("{}/hub", base_url)], &[], 300, 300, 10_000);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine =
        Engine::new(config, Arc::new(ChannelObserver::new(tx))).expect("Failed to create engine");

    engine.start();
    assert_eq!(engine.wait().await, Some(StopReason::FrontierExhausted));

    let mut counts = Vec::new();
    while counts.len() < 6 {
        let count = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("Missing stats update")
            .expect("Stats channel closed");
        counts.push(count);
    }

    assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(engine.stats().request_count(), 6);
}

#[tokio::test]
async fn test_start_and_stop_are_idempotent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Links back to itself, so the frontier never runs dry
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(html_page(format!(
            r#"<a href="{0}/loop">Again</a><a href="{0}/other">Other</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(vec![format!("{}/loop", base_url)], &[], 60_000, 60_000, 10_000);
    let mut engine = Engine::new(config, Arc::new(NullObserver)).expect("Failed to create engine");

    assert_eq!(engine.start(), EngineState::Running);
    assert_eq!(engine.start(), EngineState::Running);

    let stats = engine.stats().clone();
    wait_until(|| stats.request_count() == 1, "the first visit").await;
    let frontier = engine.frontier().clone();
    wait_until(|| frontier.len() == 2, "links to reach the frontier").await;
    assert_eq!(engine.scheduler_state(), SchedulerState::Waiting);

    assert_eq!(engine.stop().await, Some(StopReason::Cancelled));
    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.last_stop_reason(), Some(StopReason::Cancelled));
    assert_eq!(engine.stop().await, None);

    // Stopping leaves the frontier as it was
    assert_eq!(engine.frontier().len(), 2);
    assert_eq!(engine.stats().request_count(), 1);
    assert!(engine.summary().started_at.is_some());
}

#[tokio::test]
async fn test_restart_reseeds_and_ignores_stale_completions() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let root = format!("{}/root", base_url);
    let stale_link = format!("{}/from-first-run", base_url);

    // The first visit answers slowly with a link; later visits get a bare page
    Mock::given(method("GET"))
        .and(path("/root"))
        .respond_with(
            html_page(format!(r#"<a href="{}">Stale</a>"#, stale_link))
                .set_delay(Duration::from_millis(500)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/root"))
        .respond_with(html_page("leaf".to_string()))
        .mount(&mock_server)
        .await;

    let config = create_test_config(vec![root.clone()], &[], 60_000, 60_000, 10_000);
    let mut engine = Engine::new(config, Arc::new(NullObserver)).expect("Failed to create engine");

    assert_eq!(engine.start(), EngineState::Running);
    let frontier = engine.frontier().clone();
    wait_until(|| frontier.is_empty(), "the root to be dispatched").await;

    // The root request is still waiting on its delayed response
    assert_eq!(engine.stop().await, Some(StopReason::Cancelled));
    assert_eq!(engine.stats().request_count(), 0);
    let first_run = engine.frontier().clone();

    assert_eq!(engine.start(), EngineState::Running);
    assert_eq!(engine.frontier().snapshot(), vec![root.clone()]);

    wait_until(|| first_run.contains(&stale_link), "the first run to complete").await;
    let stats = engine.stats().clone();
    wait_until(|| stats.request_count() == 2, "both visits").await;

    assert!(!engine.frontier().contains(&stale_link));
    assert!(engine.frontier().is_empty());
    engine.stop().await;
}

#[tokio::test]
async fn test_invalid_config_file_is_fatal() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(br#"{"root_urls": ["https://example.com/"], "max_depth": 1}"#)
        .unwrap();
    file.flush().unwrap();

    let result = Engine::from_path(file.path(), Arc::new(NullObserver));
    assert!(matches!(result, Err(TrafficError::Config(_))));
}

#[tokio::test]
async fn test_engine_from_config_file() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(
        br#"{
            "root_urls": [],
            "blacklisted_urls": ["logout"],
            "max_depth": 5,
            "min_sleep": 2000,
            "max_sleep": 5000
        }"#,
    )
    .unwrap();
    file.flush().unwrap();

    let mut engine =
        Engine::from_path(file.path(), Arc::new(NullObserver)).expect("Failed to create engine");

    assert_eq!(engine.config().min_delay_ms, 2000);
    assert_eq!(engine.config().request_timeout_ms, 60_000);
    assert_eq!(engine.start(), EngineState::Stopped);
}
