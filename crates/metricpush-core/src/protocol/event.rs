//! Named event envelope (JSON text frame).
//!
//! ```json
//! {
//!   "v": 1,
//!   "event": "metrics",
//!   "data": {"cpu": 12, "memory": 40, "requests": 311, "timestamp": "2024-05-01T12:00:00.123Z"}
//! }
//! ```

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::error::{MetricPushError, Result};
use crate::reading::MetricsReading;

use super::PROTOCOL_VERSION;

/// Outbound envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope<T> {
    /// Protocol version.
    pub v: u8,
    /// Event name (e.g., "metrics").
    pub event: String,
    /// Event payload.
    pub data: T,
}

/// Payload of a metrics event.
///
/// `timestamp` is RFC3339 UTC with millisecond precision and a `Z` suffix,
/// the same text a JavaScript `Date` serializes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsPayload {
    pub cpu: u8,
    pub memory: u8,
    pub requests: u16,
    pub timestamp: String,
}

impl From<&MetricsReading> for MetricsPayload {
    fn from(r: &MetricsReading) -> Self {
        Self {
            cpu: r.cpu_percent(),
            memory: r.memory_percent(),
            requests: r.requests_per_second(),
            timestamp: r.captured_at().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Serialize one reading as a named event frame.
pub fn encode_metrics(event: &str, reading: &MetricsReading) -> Result<String> {
    let env = Envelope {
        v: PROTOCOL_VERSION,
        event: event.to_string(),
        data: MetricsPayload::from(reading),
    };
    serde_json::to_string(&env)
        .map_err(|e| MetricPushError::Internal(format!("json encode failed: {e}")))
}

/// Parse a metrics event frame (client side).
pub fn decode_metrics(s: &str) -> Result<Envelope<MetricsPayload>> {
    let env: Envelope<MetricsPayload> = serde_json::from_str(s)
        .map_err(|e| MetricPushError::BadRequest(format!("invalid event json: {e}")))?;
    if env.v != PROTOCOL_VERSION {
        return Err(MetricPushError::UnsupportedVersion);
    }
    Ok(env)
}
