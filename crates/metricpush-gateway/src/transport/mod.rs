//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the codec that turns readings into
//! frames and classifies inbound frames for lifecycle handling.

pub mod codec;
pub mod ws;
