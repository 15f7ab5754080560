//! Alert scheduling interface
//!
//! The engine only decides *what* to alert about and *when*; rendering,
//! sound, and the delivery channel belong to the collaborator behind this
//! trait. Scheduling is fire-and-forget: a collaborator failure must never
//! roll back or block a state transition.

use airguard_core::prelude::*;
use airguard_core::AlertKind;

use crate::session::SessionId;

/// A request to surface one timer alert after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertRequest {
    pub session_id: SessionId,
    pub kind: AlertKind,
    pub after_secs: u64,
}

/// External alert-delivery collaborator.
pub trait AlertScheduler: Send + Sync {
    /// Schedule one alert. At most one alert per `(session, kind)` is
    /// pending; scheduling again replaces the previous deadline.
    fn schedule(&self, request: AlertRequest);

    /// Drop every pending alert for a session. Called on removal and
    /// journaling so no alert can fire for a session that no longer exists.
    fn cancel_session(&self, session_id: SessionId);
}

/// Scheduler that only records intent in the log.
///
/// Stands in until a delivery collaborator is wired up; keeps the schedule
/// and cancel traffic visible.
#[derive(Debug, Default)]
pub struct TracingScheduler;

impl AlertScheduler for TracingScheduler {
    fn schedule(&self, request: AlertRequest) {
        info!(
            session = request.session_id,
            after_secs = request.after_secs,
            "alert scheduled: {}",
            request.kind.label()
        );
    }

    fn cancel_session(&self, session_id: SessionId) {
        info!(session = session_id, "pending alerts cancelled");
    }
}

/// Scheduler that drops everything. For contexts with no delivery channel.
#[derive(Debug, Default)]
pub struct NullScheduler;

impl AlertScheduler for NullScheduler {
    fn schedule(&self, _request: AlertRequest) {}

    fn cancel_session(&self, _session_id: SessionId) {}
}
