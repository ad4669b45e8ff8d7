//! Shared sinks and samplers for gateway tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use metricpush_core::error::{MetricPushError, Result};
use metricpush_core::{MetricsReading, RandomSampler, Sampler};
use metricpush_gateway::obs::GatewayMetrics;
use metricpush_gateway::realtime::{EventSink, SessionEnv};

pub const TICK: Duration = Duration::from_millis(1000);

pub fn env_with(sampler: Arc<dyn Sampler>) -> SessionEnv {
    SessionEnv::new(TICK, "metrics", sampler, Arc::new(GatewayMetrics::default()))
}

pub fn env() -> SessionEnv {
    env_with(Arc::new(RandomSampler::new()))
}

/// Records every push it accepts.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, MetricsReading)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn events(&self) -> Vec<(String, MetricsReading)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn push(&self, event: &str, reading: &MetricsReading) -> Result<()> {
        self.events.lock().unwrap().push((event.to_string(), *reading));
        Ok(())
    }
}

/// Rejects the first `fail_first` pushes, then records like `RecordingSink`.
pub struct FailingSink {
    fail_first: u64,
    attempts: AtomicU64,
    pub inner: RecordingSink,
}

impl FailingSink {
    pub fn new(fail_first: u64) -> Arc<Self> {
        Arc::new(Self {
            fail_first,
            attempts: AtomicU64::new(0),
            inner: RecordingSink::default(),
        })
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl EventSink for FailingSink {
    fn push(&self, event: &str, reading: &MetricsReading) -> Result<()> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(MetricPushError::PushDelivery("client unreachable".into()));
        }
        self.inner.push(event, reading)
    }
}

/// Fails every odd-numbered call (1st, 3rd, ...).
#[derive(Default)]
pub struct FlakySampler {
    calls: AtomicU64,
}

impl Sampler for FlakySampler {
    fn sample(&self) -> Result<MetricsReading> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n % 2 == 0 {
            return Err(MetricPushError::SampleGeneration("collector unavailable".into()));
        }
        RandomSampler.sample()
    }
}
