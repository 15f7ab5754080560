//! Per-team session state for work in the hazard zone

pub mod timers;

#[allow(clippy::module_inception)]
mod session;

#[cfg(test)]
mod tests;

// Re-export all public types at the session:: level
pub use session::{StartWorkOutcome, WorkSession};
pub use timers::SessionTimers;

// SessionId and next_session_id live here in mod.rs
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a session
pub type SessionId = u64;

static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique session ID
pub fn next_session_id() -> SessionId {
    SESSION_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}
