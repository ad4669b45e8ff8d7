//! StreamingSession lifecycle: cadence, cancellation, idempotent stop, and
//! per-tick failure handling.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod support;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metricpush_core::error::Result;
use metricpush_core::{MetricsReading, RandomSampler};
use metricpush_gateway::obs::GatewayMetrics;
use metricpush_gateway::realtime::{ConnId, EventSink, SessionEnv, SessionState, StreamingSession};
use tokio::time::sleep;

use support::{env, env_with, FailingSink, FlakySampler, RecordingSink};

async fn settle() {
    // Lets the runtime drop aborted schedule tasks.
    sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn pushes_once_per_second() {
    let env = env();
    let sink = RecordingSink::new();
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env).unwrap();

    sleep(Duration::from_millis(3500)).await;

    assert_eq!(sink.count(), 3);
    assert_eq!(session.delivered(), 3);
    assert!(sink.events().iter().all(|(event, _)| event == "metrics"));
    assert_eq!(env.metrics().pushes.get(&[("result", "ok")]), 3);
    assert_eq!(env.metrics().tick_duration.count(&[]), 3);
}

#[tokio::test(start_paused = true)]
async fn first_push_waits_a_full_interval() {
    let sink = RecordingSink::new();
    let _session = StreamingSession::start(ConnId(1), sink.clone(), &env()).unwrap();

    sleep(Duration::from_millis(999)).await;
    assert_eq!(sink.count(), 0);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(sink.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn active_session_owns_exactly_one_schedule() {
    let env = env();
    let session = StreamingSession::start(ConnId(1), RecordingSink::new(), &env).unwrap();

    assert_eq!(session.state(), SessionState::Active);
    assert!(session.has_schedule());
    assert_eq!(env.live_schedules(), 1);

    session.stop();
    settle().await;
    assert!(!session.has_schedule());
    assert_eq!(env.live_schedules(), 0);
}

#[tokio::test(start_paused = true)]
async fn no_push_after_stop() {
    let sink = RecordingSink::new();
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env()).unwrap();

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(sink.count(), 1);

    assert!(session.stop());
    assert_eq!(session.state(), SessionState::Stopped);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(sink.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let env = env();
    let sink = RecordingSink::new();
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env).unwrap();

    assert!(session.stop());
    assert!(!session.stop());
    assert!(!session.stop());
    assert!(!session.is_active());

    settle().await;
    assert_eq!(env.live_schedules(), 0);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(sink.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_before_first_tick_sends_nothing() {
    let sink = RecordingSink::new();
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env()).unwrap();

    sleep(Duration::from_millis(50)).await;
    session.stop();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(sink.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn drop_stops_session() {
    let env = env();
    let sink = RecordingSink::new();
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env).unwrap();
    drop(session);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(sink.count(), 0);
    assert_eq!(env.live_schedules(), 0);
}

#[tokio::test(start_paused = true)]
async fn push_failure_is_not_fatal() {
    let env = env();
    let sink = FailingSink::new(2);
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env).unwrap();

    sleep(Duration::from_millis(4500)).await;

    assert_eq!(sink.attempts(), 4);
    assert_eq!(sink.inner.count(), 2);
    assert_eq!(session.delivered(), 2);
    assert!(session.is_active());
    assert_eq!(env.metrics().pushes.get(&[("result", "failed")]), 2);
    assert_eq!(env.metrics().pushes.get(&[("result", "ok")]), 2);
}

#[tokio::test(start_paused = true)]
async fn sample_failure_skips_that_tick_only() {
    let env = env_with(Arc::new(FlakySampler::default()));
    let sink = RecordingSink::new();
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env).unwrap();

    sleep(Duration::from_millis(4500)).await;

    assert_eq!(sink.count(), 2);
    assert_eq!(env.metrics().sample_errors.get(&[]), 2);
    assert!(session.is_active());
}

#[test]
fn start_requires_runtime() {
    let err = StreamingSession::start(ConnId(1), RecordingSink::new(), &env())
        .err()
        .expect("must fail outside a runtime");
    assert_eq!(err.client_code().as_str(), "INTERNAL");
}

/// Holds every push long enough for `stop()` to race it.
#[derive(Default)]
struct SlowSink {
    pushes: AtomicU64,
}

impl EventSink for SlowSink {
    fn push(&self, _event: &str, _reading: &MetricsReading) -> Result<()> {
        std::thread::sleep(Duration::from_millis(5));
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_wins_against_in_flight_tick() {
    let env = SessionEnv::new(
        Duration::from_millis(10),
        "metrics",
        Arc::new(RandomSampler::new()),
        Arc::new(GatewayMetrics::default()),
    );
    let sink = Arc::new(SlowSink::default());
    let session = StreamingSession::start(ConnId(1), sink.clone(), &env).unwrap();

    sleep(Duration::from_millis(150)).await;
    session.stop();
    let at_stop = sink.pushes.load(Ordering::SeqCst);
    assert!(at_stop > 0);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.pushes.load(Ordering::SeqCst), at_stop);
}

#[tokio::test(start_paused = true)]
async fn session_pushes_under_configured_event_and_cadence() {
    let env = SessionEnv::new(
        Duration::from_millis(250),
        "host.metrics",
        Arc::new(RandomSampler::new()),
        Arc::new(GatewayMetrics::default()),
    );
    let sink = RecordingSink::new();
    let session = StreamingSession::start(ConnId(42), sink.clone(), &env).unwrap();
    assert_eq!(session.conn_id(), ConnId(42));

    sleep(env.interval() * 4 + Duration::from_millis(100)).await;

    assert_eq!(sink.count(), 4);
    assert!(sink.events().iter().all(|(event, _)| event == env.event()));
}
