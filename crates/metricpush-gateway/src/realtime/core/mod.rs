//! Session lifecycle components: the streaming session itself and the
//! connection-keyed registry that owns every live session.

mod session;
mod session_registry;

pub use session::{SessionEnv, SessionState, StreamingSession};
pub use session_registry::SessionHub;
