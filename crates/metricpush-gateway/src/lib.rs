//! metricpush gateway library entry.
//!
//! Wires the WebSocket transport, the session hub, and the ops endpoints into
//! one server. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod transport;
