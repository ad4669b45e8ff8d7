//! Wire formats pushed to clients.
//!
//! Every outbound frame is a JSON text envelope naming an event and carrying
//! its payload. Decoding is provided for clients and tests; the gateway never
//! parses inbound application frames.

pub mod event;

pub use event::{decode_metrics, encode_metrics, Envelope, MetricsPayload};

/// Envelope protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Event name readings are pushed under unless configured otherwise.
pub const METRICS_EVENT: &str = "metrics";
