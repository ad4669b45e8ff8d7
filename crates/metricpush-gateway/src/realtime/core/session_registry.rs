use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use metricpush_core::error::{MetricPushError, Result};

use crate::realtime::core::session::{SessionEnv, StreamingSession};
use crate::realtime::types::{ConnId, EventSink};

/// Session registry: `conn_id -> StreamingSession`.
///
/// The transport reports connects and disconnects here; the hub owns every
/// live session and is the only place sessions are created or stopped.
pub struct SessionHub {
    sessions: DashMap<ConnId, StreamingSession>,
    env: SessionEnv,
    seq: AtomicU64,
    closed: AtomicBool,
}

impl SessionHub {
    pub fn new(env: SessionEnv) -> Self {
        Self {
            sessions: DashMap::new(),
            env,
            seq: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Allocate a fresh connection id.
    pub fn next_conn_id(&self) -> ConnId {
        ConnId(self.seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Start a session for a newly accepted connection.
    ///
    /// Fails if the id is already bound or the hub has been shut down.
    pub fn on_connect(&self, conn_id: ConnId, sink: Arc<dyn EventSink>) -> Result<()> {
        if self.is_closed() {
            return Err(MetricPushError::Internal("hub is shutting down".into()));
        }

        match self.sessions.entry(conn_id) {
            Entry::Occupied(_) => {
                return Err(MetricPushError::BadRequest(format!(
                    "connection {conn_id} already has a session"
                )));
            }
            Entry::Vacant(slot) => {
                let session = StreamingSession::start(conn_id, sink, &self.env)?;
                slot.insert(session);
            }
        }
        self.env.metrics().sessions_active.inc(&[]);

        // A concurrent shutdown may have drained the map before our insert.
        if self.is_closed() {
            self.on_disconnect(conn_id);
            return Err(MetricPushError::Internal("hub is shutting down".into()));
        }
        Ok(())
    }

    /// Stop and forget the session bound to `conn_id`. Returns `false` when
    /// no session was bound (already disconnected or never connected).
    pub fn on_disconnect(&self, conn_id: ConnId) -> bool {
        let Some((_, session)) = self.sessions.remove(&conn_id) else {
            return false;
        };
        session.stop();
        self.env.metrics().sessions_active.dec(&[]);
        true
    }

    /// Stop every session and refuse new ones. Returns how many were stopped.
    pub fn shutdown(&self) -> usize {
        self.closed.store(true, Ordering::Release);

        let ids: Vec<ConnId> = self.sessions.iter().map(|e| *e.key()).collect();
        let stopped = ids.into_iter().filter(|id| self.on_disconnect(*id)).count();
        tracing::info!(stopped, "session hub shut down");
        stopped
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn contains(&self, conn_id: ConnId) -> bool {
        self.sessions.contains_key(&conn_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Schedule tasks still alive. Trails `active_sessions` briefly after a
    /// disconnect, until the runtime drops the aborted task.
    pub fn live_schedules(&self) -> usize {
        self.env.live_schedules()
    }

    pub fn env(&self) -> &SessionEnv {
        &self.env
    }
}
