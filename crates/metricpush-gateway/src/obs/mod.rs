//! Lightweight in-process counters (dependency-free).
//!
//! Stored as atomics keyed by label sets and rendered by the `/metrics`
//! handler in Prometheus text format.

pub mod metrics;

pub use metrics::GatewayMetrics;
