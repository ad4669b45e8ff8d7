//! Streaming session: one connection bound to one periodic push schedule.
//!
//! Lifecycle is `Active -> Stopped`, exactly once. The state and the schedule
//! handle share one lock, and every push happens while holding it, so once
//! `stop()` returns no further push can reach the sink even if a tick was
//! already in flight on another worker.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

use metricpush_core::error::{MetricPushError, Result};
use metricpush_core::Sampler;

use crate::obs::GatewayMetrics;
use crate::realtime::types::{ConnId, EventSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Stopped,
}

/// Everything a session needs besides its connection. Shared by all sessions
/// of one hub; cloning is cheap.
#[derive(Clone)]
pub struct SessionEnv {
    interval: Duration,
    event: Arc<str>,
    sampler: Arc<dyn Sampler>,
    metrics: Arc<GatewayMetrics>,
    live_schedules: Arc<AtomicUsize>,
}

impl SessionEnv {
    pub fn new(
        interval: Duration,
        event: impl Into<Arc<str>>,
        sampler: Arc<dyn Sampler>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            interval,
            event: event.into(),
            sampler,
            metrics,
            live_schedules: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Schedule tasks that have been spawned and not yet dropped.
    pub fn live_schedules(&self) -> usize {
        self.live_schedules.load(Ordering::Acquire)
    }
}

/// Decrements the live-schedule count when the schedule task is dropped,
/// whether it ran to completion, was aborted, or was never polled.
struct ScheduleGuard(Arc<AtomicUsize>);

impl ScheduleGuard {
    fn register(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(live))
    }
}

impl Drop for ScheduleGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

struct Lifecycle {
    state: SessionState,
    schedule: Option<AbortHandle>,
}

struct Shared {
    lifecycle: Mutex<Lifecycle>,
    delivered: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct StreamingSession {
    conn_id: ConnId,
    shared: Arc<Shared>,
}

impl StreamingSession {
    /// Start pushing to `sink` every `env.interval()`. The first push happens
    /// one full interval after start.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(conn_id: ConnId, sink: Arc<dyn EventSink>, env: &SessionEnv) -> Result<Self> {
        let rt = tokio::runtime::Handle::try_current()
            .map_err(|e| MetricPushError::Internal(format!("no async runtime: {e}")))?;

        let shared = Arc::new(Shared {
            lifecycle: Mutex::new(Lifecycle {
                state: SessionState::Active,
                schedule: None,
            }),
            delivered: AtomicU64::new(0),
        });

        // Hold the lifecycle lock across spawn so the task cannot observe a
        // session without its schedule handle.
        {
            let mut lc = shared.lock();
            let guard = ScheduleGuard::register(&env.live_schedules);
            let first = Instant::now() + env.interval;
            let task = run_schedule(conn_id, Arc::clone(&shared), sink, env.clone(), first, guard)
                .instrument(tracing::debug_span!("stream", %conn_id));
            lc.schedule = Some(rt.spawn(task).abort_handle());
        }

        tracing::debug!(%conn_id, interval_ms = env.interval.as_millis() as u64, "session started");
        Ok(Self { conn_id, shared })
    }

    /// Cancel the schedule. Returns `true` only for the call that performed
    /// the transition; later calls are no-ops.
    pub fn stop(&self) -> bool {
        let mut lc = self.shared.lock();
        if lc.state == SessionState::Stopped {
            return false;
        }
        lc.state = SessionState::Stopped;
        if let Some(handle) = lc.schedule.take() {
            handle.abort();
        }
        drop(lc);

        tracing::debug!(conn_id = %self.conn_id, delivered = self.delivered(), "session stopped");
        true
    }

    pub fn conn_id(&self) -> ConnId {
        self.conn_id
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Whether this session still owns a schedule handle.
    pub fn has_schedule(&self) -> bool {
        self.shared.lock().schedule.is_some()
    }

    /// Pushes the sink accepted.
    pub fn delivered(&self) -> u64 {
        self.shared.delivered.load(Ordering::Relaxed)
    }
}

impl Drop for StreamingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_schedule(
    conn_id: ConnId,
    shared: Arc<Shared>,
    sink: Arc<dyn EventSink>,
    env: SessionEnv,
    first: Instant,
    _guard: ScheduleGuard,
) {
    let mut ticker = tokio::time::interval_at(first, env.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let started = std::time::Instant::now();

        let reading = match env.sampler.sample() {
            Ok(r) => r,
            Err(e) => {
                env.metrics.sample_errors.inc(&[]);
                tracing::warn!(
                    %conn_id,
                    code = e.client_code().as_str(),
                    error = %e,
                    "sample failed, skipping tick"
                );
                continue;
            }
        };

        {
            let lc = shared.lock();
            if lc.state == SessionState::Stopped {
                break;
            }
            match sink.push(&env.event, &reading) {
                Ok(()) => {
                    shared.delivered.fetch_add(1, Ordering::Relaxed);
                    env.metrics.pushes.inc(&[("result", "ok")]);
                    tracing::trace!(%conn_id, "metrics pushed");
                }
                Err(e) => {
                    env.metrics.pushes.inc(&[("result", "failed")]);
                    tracing::warn!(
                        %conn_id,
                        code = e.client_code().as_str(),
                        error = %e,
                        "push failed"
                    );
                }
            }
        }

        env.metrics.tick_duration.observe(&[], started.elapsed());
    }
}
