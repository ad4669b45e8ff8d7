use std::fmt;

use axum::extract::ws::Message;
use tokio::sync::mpsc::{self, error::TrySendError};

use metricpush_core::error::{MetricPushError, Result};
use metricpush_core::MetricsReading;

use crate::transport::codec;

/// Transport-assigned connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound push capability for one connection.
///
/// Implementations must not block: a push either hands the event to the
/// transport or fails immediately.
pub trait EventSink: Send + Sync {
    fn push(&self, event: &str, reading: &MetricsReading) -> Result<()>;
}

/// One WebSocket connection's outbound queue sender.
#[derive(Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
}

impl Connection {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }
}

impl EventSink for Connection {
    /// Lossy: a full queue drops this event instead of waiting.
    fn push(&self, event: &str, reading: &MetricsReading) -> Result<()> {
        let msg = codec::encode_event(event, reading)?;
        self.tx.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => MetricPushError::PushDelivery("outbound queue full".into()),
            TrySendError::Closed(_) => MetricPushError::PushDelivery("connection closed".into()),
        })
    }
}
