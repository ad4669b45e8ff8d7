//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Bind the connection to a streaming session (`SessionHub::on_connect`)
//! - Single writer task for the socket, fed by a bounded outbound queue
//! - Lifecycle: ping/pong, idle timeout, drain on shutdown
//! - Unbind on every exit path (`SessionHub::on_disconnect`)

use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::Instrument;

use metricpush_core::error::Result;

use crate::app_state::AppState;
use crate::realtime::{ConnId, Connection, SessionHub};
use crate::transport::codec::{classify, Inbound};

/// How often the idle deadline is checked.
const IDLE_CHECK_EVERY: Duration = Duration::from_millis(250);

/// Unbinds the session when the connection task ends, however it ends.
struct DisconnectGuard {
    hub: Arc<SessionHub>,
    conn_id: ConnId,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if self.hub.on_disconnect(self.conn_id) {
            tracing::info!(conn_id = %self.conn_id, "client disconnected");
        }
    }
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    app.metrics().ws_upgrades.inc(&[]);
    ws.on_upgrade(move |socket| async move {
        let conn_id = app.hub().next_conn_id();
        let span = tracing::info_span!("ws_session", %conn_id);
        if let Err(e) = run_session(app, conn_id, socket).instrument(span).await {
            tracing::warn!(
                %conn_id,
                code = e.client_code().as_str(),
                error = %e,
                "session ended with error"
            );
        }
    })
}

fn going_away(reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::AWAY,
        reason: reason.into(),
    }))
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, conn_id: ConnId, socket: WebSocket) -> Result<()> {
    let gw = &app.cfg().gateway;
    let hub = app.hub();
    let mut drain = app.drain_signal();

    // ---- outbound channel
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(gw.outbound_queue);

    // ---- split socket
    let (mut ws_tx, mut ws_rx) = socket.split();

    // ---- bind session
    if let Err(e) = hub.on_connect(conn_id, Arc::new(Connection::new(out_tx.clone()))) {
        let _ = ws_tx.send(going_away("server shutting down")).await;
        return Err(e);
    }
    let _unbind = DisconnectGuard {
        hub: Arc::clone(&hub),
        conn_id,
    };
    tracing::info!("client connected");

    // ---- timers
    let idle_timeout = gw.idle_timeout();
    let ping_every = gw.ping_interval();
    let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut idle_tick = tokio::time::interval(IDLE_CHECK_EVERY);
    idle_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                if ws_tx.send(m).await.is_err() {
                    break;
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                last_activity = Instant::now();

                match classify(msg) {
                    Inbound::Data { bytes_len } => {
                        tracing::debug!(bytes_len, "ignoring inbound application frame");
                    }
                    Inbound::Ping(payload) => {
                        let _ = out_tx.try_send(Message::Pong(payload));
                    }
                    Inbound::Pong => {}
                    Inbound::Close => break,
                }
            }

            // keepalive
            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }

            // idle timeout
            _ = idle_tick.tick() => {
                if last_activity.elapsed() >= idle_timeout {
                    tracing::info!(idle_ms = idle_timeout.as_millis() as u64, "idle timeout");
                    let _ = ws_tx.send(going_away("idle timeout")).await;
                    break;
                }
            }

            // server drain
            changed = drain.changed() => {
                if changed.is_err() || *drain.borrow() {
                    let _ = ws_tx.send(going_away("server shutting down")).await;
                    break;
                }
            }
        }
    }

    Ok(())
}
