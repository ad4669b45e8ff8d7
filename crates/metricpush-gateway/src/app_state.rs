//! Shared application state for the metricpush gateway.
//!
//! Owns the session hub, the counters, and the drain signal every
//! connection task watches.

use std::sync::Arc;

use tokio::sync::watch;

use metricpush_core::error::Result;
use metricpush_core::{RandomSampler, Sampler};

use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::realtime::{SessionEnv, SessionHub};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    hub: Arc<SessionHub>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    drain_tx: watch::Sender<bool>,
}

impl AppState {
    /// Build application state with the random sampler.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        Self::with_sampler(cfg, Arc::new(RandomSampler::new()))
    }

    pub fn with_sampler(cfg: GatewayConfig, sampler: Arc<dyn Sampler>) -> Result<Self> {
        cfg.validate()?;

        let metrics = Arc::new(GatewayMetrics::default());
        let env = SessionEnv::new(
            cfg.stream.interval(),
            cfg.stream.event.as_str(),
            sampler,
            Arc::clone(&metrics),
        );
        let (drain_tx, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, drain_tx }),
            hub: Arc::new(SessionHub::new(env)),
            metrics,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn hub(&self) -> Arc<SessionHub> {
        Arc::clone(&self.hub)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    pub fn drain_signal(&self) -> watch::Receiver<bool> {
        self.inner.drain_tx.subscribe()
    }

    /// Begin shutdown: report not-ready, tell connections to close, stop
    /// every session. Safe to call more than once.
    pub fn begin_drain(&self) {
        self.metrics.set_draining();
        self.inner.drain_tx.send_replace(true);
        let stopped = self.hub.shutdown();
        tracing::info!(stopped, "draining");
    }

    /// Gauges computed on scrape.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("metricpush_sessions_registered", self.hub.active_sessions() as u64),
            ("metricpush_schedules_live", self.hub.live_schedules() as u64),
        ]
    }
}
