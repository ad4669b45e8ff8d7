//! Shared error type across metricpush crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed message or config.
    BadRequest,
    /// Unsupported config or protocol version.
    UnsupportedVersion,
    /// A sampler could not produce a reading.
    SampleFailed,
    /// The transport could not deliver a push.
    PushFailed,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::SampleFailed => "SAMPLE_FAILED",
            ClientCode::PushFailed => "PUSH_FAILED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricPushError>;

/// Unified error type used by core and gateway.
///
/// `SampleGeneration` and `PushDelivery` are per-tick errors: sessions log
/// them and keep running.
#[derive(Debug, Error)]
pub enum MetricPushError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("sample generation failed: {0}")]
    SampleGeneration(String),
    #[error("push delivery failed: {0}")]
    PushDelivery(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricPushError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MetricPushError::BadRequest(_) => ClientCode::BadRequest,
            MetricPushError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            MetricPushError::SampleGeneration(_) => ClientCode::SampleFailed,
            MetricPushError::PushDelivery(_) => ClientCode::PushFailed,
            MetricPushError::Internal(_) => ClientCode::Internal,
        }
    }
}
