//! Frame codec for the transport layer.
//!
//! - Outbound: reading => named JSON event in a Text frame
//! - Inbound: application frames are classified but never parsed; only
//!   Ping/Pong/Close matter for lifecycle management

use axum::extract::ws::Message;
use metricpush_core::{error::Result, protocol, MetricsReading};

#[derive(Debug)]
pub enum Inbound {
    /// Text or binary frame from the client. This server has no inbound API.
    Data { bytes_len: usize },
    Ping(Vec<u8>),
    Pong,
    Close,
}

pub fn encode_event(event: &str, reading: &MetricsReading) -> Result<Message> {
    Ok(Message::Text(protocol::encode_metrics(event, reading)?))
}

pub fn classify(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Data { bytes_len: s.len() },
        Message::Binary(b) => Inbound::Data { bytes_len: b.len() },
        Message::Ping(v) => Inbound::Ping(v),
        Message::Pong(_) => Inbound::Pong,
        Message::Close(_) => Inbound::Close,
    }
}
