//! # airguard-app - Session Orchestration
//!
//! Owns the mutable safety state of every active team: the per-team
//! [`WorkSession`] state machine, the single-writer [`SessionRegistry`]
//! with its global one-second clock, and the per-surface
//! [`SessionController`] that reads snapshots and submits transitions.
//!
//! Collaborators are injected as trait objects at registry construction:
//!
//! - [`Clock`] — wall-clock source ([`SystemClock`] in production)
//! - [`AlertScheduler`] — alert delivery; the engine only supplies
//!   kind + delay
//! - [`SessionStore`] — lossless persistence of the active session set
//!
//! The registry is the only writer. Surfaces hold disposable snapshots and
//! never sync local edits back.

pub mod alerts;
pub mod clock;
pub mod config;
pub mod controller;
pub mod journal;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod store;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Re-export commonly used types at crate root for convenience
pub use alerts::{AlertRequest, AlertScheduler, NullScheduler, TracingScheduler};
pub use clock::{Clock, SystemClock};
pub use config::Settings;
pub use controller::{SessionController, WorkSnapshot};
pub use journal::JournalEntry;
pub use registry::{SessionRegistry, SharedRegistry, TimerExpiry, MAX_SESSIONS};
pub use runtime::{share, spawn_clock, SUSPENSION_GAP_THRESHOLD_SECS};
pub use session::{SessionId, SessionTimers, StartWorkOutcome, WorkSession};
pub use store::{JsonFileStore, SessionStore};
