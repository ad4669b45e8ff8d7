//! Realtime runtime: per-connection streaming sessions and the registry that
//! binds them to transport connections.

pub mod core;
pub mod types;

pub use core::{SessionEnv, SessionHub, SessionState, StreamingSession};
pub use types::{ConnId, Connection, EventSink};
