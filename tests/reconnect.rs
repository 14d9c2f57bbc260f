//! 退避重连、重试上限与手动重连路径的集成测试。
//! Integration tests for backoff-driven reconnects, retry caps and the
//! manual reconnect paths.

pub mod common;

use common::harness::{init_tracing, EventLog, OpenOutcome, RecordedEvent, ScriptedConnector};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tether::backoff::{JitterMode, RetryPolicy};
use tether::config::Config;
use tether::error::Error;
use tether::event::EventKind;
use tether::link::{Link, LinkState};

/// Deterministic exponential backoff: 100ms, 200ms, 400ms, ...
fn policy(max_attempts: Option<u32>) -> RetryPolicy {
    RetryPolicy {
        jitter: JitterMode::None,
        initial_delay: Duration::from_millis(100),
        max_attempts,
        delay_first_attempt: true,
        ..RetryPolicy::default()
    }
}

fn config(max_attempts: Option<u32>) -> Config {
    Config {
        connect_timeout: Duration::from_secs(1),
        keepalive_interval: Duration::ZERO,
        retry: policy(max_attempts),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_endpoint_backs_off_then_gives_up() {
    init_tracing();
    let connector = ScriptedConnector::always_failing();
    let link = Link::connect(connector.clone(), config(Some(3)));
    let log = EventLog::attach(&link);

    // Initial attempt fails immediately; retries follow at 100/200/400ms.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(connector.opens(), 1);
    assert_eq!(log.count(|e| *e == RecordedEvent::Offline), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(connector.opens(), 2);

    tokio::time::sleep(Duration::from_millis(180)).await;
    assert_eq!(connector.opens(), 2);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(connector.opens(), 3);

    tokio::time::sleep(Duration::from_millis(380)).await;
    assert_eq!(connector.opens(), 3);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(connector.opens(), 4);

    // The fourth failure exceeds the cap of three retries.
    assert!(link.is_ended());
    assert_eq!(log.count(|e| *e == RecordedEvent::Offline), 1);
    assert_eq!(log.count(|e| *e == RecordedEvent::End), 0);
    assert_eq!(
        log.count(|e| matches!(e, RecordedEvent::Error(msg) if msg.contains("exhausted"))),
        1
    );
    assert!(matches!(
        link.last_error().as_deref(),
        Some(Error::RetriesExhausted { attempts: 4 })
    ));

    // Parked: no further attempts without a manual reconnect.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(connector.opens(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_manual_reconnect_revives_exhausted_link() {
    init_tracing();
    let connector = ScriptedConnector::always_ok();
    connector.plan([OpenOutcome::Fail(Duration::ZERO)]);
    let link = Link::connect(connector.clone(), config(Some(0)));
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(link.is_ended());
    assert_eq!(connector.opens(), 1);

    link.reconnect();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(link.state(), LinkState::Connected);
    assert_eq!(connector.opens(), 2);
    assert_eq!(link.attempts(), 0);
    assert!(link.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_manual_reconnect_skips_backoff_wait() {
    init_tracing();
    let connector = ScriptedConnector::always_ok();
    connector.plan([OpenOutcome::Fail(Duration::ZERO)]);
    let mut cfg = config(None);
    cfg.retry.initial_delay = Duration::from_secs(10);
    let link = Link::connect(connector.clone(), cfg);
    let log = EventLog::attach(&link);
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(link.state(), LinkState::Reconnecting);
    assert_eq!(connector.opens(), 1);

    link.reconnect();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(link.state(), LinkState::Connected);
    assert_eq!(connector.opens(), 2);
    assert_eq!(log.count(|e| *e == RecordedEvent::Reconnect), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_feed_drives_a_full_reconnect_cycle() {
    init_tracing();
    let connector = ScriptedConnector::always_ok();
    let mut cfg = config(None);
    cfg.retry.delay_first_attempt = false;
    let link = Link::connect(connector.clone(), cfg);
    let log = EventLog::attach(&link);
    tokio::time::sleep(Duration::from_millis(1)).await;

    link.feed_close(None);
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(
        log.snapshot(),
        vec![
            RecordedEvent::Connect(0),
            RecordedEvent::Close { has_error: false },
            RecordedEvent::Offline,
            RecordedEvent::Reconnect,
            RecordedEvent::Connect(1),
        ]
    );
    assert_eq!(link.state(), LinkState::Connected);
    assert_eq!(link.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_listener_feedback_preserves_event_order() {
    init_tracing();
    let connector = ScriptedConnector::always_ok();
    let mut cfg = config(None);
    cfg.retry.delay_first_attempt = false;
    let link = Link::new(connector.clone(), cfg);
    let log = EventLog::attach(&link);

    // A listener that closes the connection from inside the first Connect
    // delivery. Its batch must land after the one being delivered, not
    // interleave with it.
    let fed = Arc::new(AtomicBool::new(false));
    let inner = link.clone();
    let _feeder = link.on(EventKind::Connect, move |_| {
        if !fed.swap(true, Ordering::SeqCst) {
            inner.feed_close(None);
        }
    });
    link.reconnect();
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(
        log.snapshot(),
        vec![
            RecordedEvent::Connect(0),
            RecordedEvent::Close { has_error: false },
            RecordedEvent::Offline,
            RecordedEvent::Reconnect,
            RecordedEvent::Connect(1),
        ]
    );
    assert_eq!(link.state(), LinkState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_error_feed_reports_then_closes() {
    init_tracing();
    let connector = ScriptedConnector::always_ok();
    let mut cfg = config(None);
    cfg.retry.delay_first_attempt = false;
    let link = Link::connect(connector.clone(), cfg);
    let log = EventLog::attach(&link);
    tokio::time::sleep(Duration::from_millis(1)).await;

    link.feed_error(Error::Transmission("wire torn".into()));
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(
        log.snapshot(),
        vec![
            RecordedEvent::Connect(0),
            RecordedEvent::Error("Transmission error: wire torn".to_string()),
            RecordedEvent::Close { has_error: true },
            RecordedEvent::Offline,
            RecordedEvent::Reconnect,
            RecordedEvent::Connect(1),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_predicate_refusal_parks_link() {
    init_tracing();
    let connector = ScriptedConnector::always_failing();
    let mut cfg = config(None);
    cfg.retry.predicate = Some(Arc::new(|_error, attempt| attempt < 2));
    let link = Link::connect(connector.clone(), cfg);
    let log = EventLog::attach(&link);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(connector.opens(), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(connector.opens(), 2);
    assert!(link.is_ended());
    assert!(matches!(
        link.last_error().as_deref(),
        Some(Error::RetryRefused { attempts: 2 })
    ));
    assert_eq!(log.count(|e| *e == RecordedEvent::End), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(connector.opens(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_hung_open_counts_as_timeout_failure() {
    init_tracing();
    let connector = ScriptedConnector::new(OpenOutcome::Hang);
    let mut cfg = config(Some(1));
    cfg.connect_timeout = Duration::from_millis(250);
    let link = Link::connect(connector.clone(), cfg);
    let log = EventLog::attach(&link);

    // Attempt 1 hangs until the 250ms timeout, retry waits 100ms, attempt 2
    // hangs until its own timeout, and the cap of one retry is then hit.
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(connector.opens(), 2);
    assert_eq!(log.count(|e| matches!(e, RecordedEvent::Connect(_))), 0);
    assert_eq!(
        log.count(|e| matches!(e, RecordedEvent::Error(msg) if msg.contains("timed out"))),
        2
    );
    assert!(link.is_ended());
}

#[tokio::test(start_paused = true)]
async fn test_attempt_counter_resets_on_success() {
    init_tracing();
    let connector = ScriptedConnector::always_ok();
    connector.plan([
        OpenOutcome::Fail(Duration::ZERO),
        OpenOutcome::Fail(Duration::ZERO),
    ]);
    let link = Link::connect(connector.clone(), config(None));
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Two failures so far (initial plus the 100ms retry).
    assert_eq!(link.attempts(), 2);
    assert_eq!(link.state(), LinkState::Reconnecting);

    // The 200ms retry succeeds and clears the counter.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(link.state(), LinkState::Connected);
    assert_eq!(link.attempts(), 0);
    assert_eq!(connector.opens(), 3);
}
