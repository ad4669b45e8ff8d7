use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use metricpush_core::error::{MetricPushError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub stream: StreamSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            stream: StreamSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricPushError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.stream.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    #[serde(default = "default_allow_any_origin")]
    pub allow_any_origin: bool,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ws_path: default_ws_path(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue: default_outbound_queue(),
            allow_any_origin: default_allow_any_origin(),
        }
    }
}

/// Paths owned by the ops endpoints.
const RESERVED_PATHS: [&str; 3] = ["/healthz", "/readyz", "/metrics"];

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.ws_path.starts_with('/') || self.ws_path.len() < 2 {
            return Err(MetricPushError::BadRequest(
                "gateway.ws_path must start with '/' and name a route".into(),
            ));
        }
        if RESERVED_PATHS.contains(&self.ws_path.as_str()) {
            return Err(MetricPushError::BadRequest(format!(
                "gateway.ws_path collides with ops endpoint {}",
                self.ws_path
            )));
        }
        if !(1000..=120000).contains(&self.ping_interval_ms) {
            return Err(MetricPushError::BadRequest(
                "gateway.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        if !(5000..=600000).contains(&self.idle_timeout_ms) {
            return Err(MetricPushError::BadRequest(
                "gateway.idle_timeout_ms must be between 5000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(MetricPushError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(MetricPushError::BadRequest(
                "gateway.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            MetricPushError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_ws_path() -> String {
    "/v1/ws".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue() -> usize {
    64
}
fn default_allow_any_origin() -> bool {
    true
}

/// Push cadence and event naming.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_event")]
    pub event: String,
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            event: default_event(),
        }
    }
}

impl StreamSection {
    pub fn validate(&self) -> Result<()> {
        if !(10..=60000).contains(&self.interval_ms) {
            return Err(MetricPushError::BadRequest(
                "stream.interval_ms must be between 10 and 60000".into(),
            ));
        }
        if self.event.trim().is_empty() {
            return Err(MetricPushError::BadRequest("stream.event must not be empty".into()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_interval_ms() -> u64 {
    1000
}
fn default_event() -> String {
    metricpush_core::protocol::METRICS_EVENT.into()
}
