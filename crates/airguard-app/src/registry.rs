//! Owns every active work session: the single writer and tick source
//!
//! All session mutation — transitions, the per-second tick, and background
//! reconciliation — goes through this registry, so a tick can never observe
//! a session mid-transition. Surfaces read snapshots and submit transitions;
//! they never hold independently mutable session state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use airguard_core::prelude::*;
use airguard_core::{AlertKind, OperationContext};

use crate::alerts::{AlertRequest, AlertScheduler};
use crate::clock::Clock;
use crate::journal::JournalEntry;
use crate::session::timers::COMMUNICATION_CHECK_INTERVAL_SECS;
use crate::session::{SessionId, StartWorkOutcome, WorkSession};
use crate::store::SessionStore;

/// Maximum number of concurrent sessions
pub const MAX_SESSIONS: usize = 9;

/// Registry shared between the tick task and per-surface controllers.
///
/// The mutex serializes every mutation (single-writer); lock, mutate or
/// snapshot, release — nothing holds it across an await point.
pub type SharedRegistry = Arc<Mutex<SessionRegistry>>;

/// A timer that crossed from running to zero during a tick or reconcile.
///
/// Raised exactly once per crossing, never again while the timer sits at
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerExpiry {
    pub session_id: SessionId,
    pub kind: AlertKind,
}

/// The authoritative set of active work sessions.
pub struct SessionRegistry {
    /// All sessions indexed by session ID
    sessions: HashMap<SessionId, WorkSession>,

    /// Order of session IDs (stable listing for surfaces)
    session_order: Vec<SessionId>,

    /// Currently selected/displayed session
    selected_index: usize,

    /// Initial value for each new session's check-in countdown
    communication_interval_secs: u64,

    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn AlertScheduler>,
    store: Arc<dyn SessionStore>,
}

impl SessionRegistry {
    /// Create a registry with its collaborators.
    ///
    /// Any active sessions left behind by a previous run are discarded:
    /// they represent live, time-sensitive state that cannot be meaningfully
    /// resumed after a restart.
    pub fn new(
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn AlertScheduler>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        match store.load() {
            Ok(stale) if !stale.is_empty() => {
                info!(
                    count = stale.len(),
                    "discarding stale active sessions from previous run"
                );
                if let Err(e) = store.save(&[]) {
                    warn!("failed to clear stale session set: {e}");
                }
            }
            Ok(_) => {}
            Err(e) => warn!("failed to read persisted session set: {e}"),
        }

        Self {
            sessions: HashMap::new(),
            session_order: Vec::new(),
            selected_index: 0,
            communication_interval_secs: COMMUNICATION_CHECK_INTERVAL_SECS,
            clock,
            scheduler,
            store,
        }
    }

    /// Override the check-in interval for newly created sessions.
    pub fn with_communication_interval(mut self, secs: u64) -> Self {
        self.communication_interval_secs = secs;
        self
    }

    // ─────────────────────────────────────────────────────────
    // Structural Mutations
    // ─────────────────────────────────────────────────────────

    /// Create a session for a team committing to the hazard zone.
    pub fn add_session(&mut self, context: OperationContext) -> Result<SessionId> {
        if self.sessions.len() >= MAX_SESSIONS {
            return Err(Error::SessionLimit {
                limit: MAX_SESSIONS,
            });
        }

        // A team is identified by its roster name; at most one active
        // session per team.
        if self
            .sessions
            .values()
            .any(|s| s.context.team_name == context.team_name)
        {
            return Err(Error::duplicate_team(context.team_name));
        }

        let session = WorkSession::new(context, self.communication_interval_secs, self.clock.now())?;
        let id = session.id;

        info!(session = id, team = %session.context.team_name, "session created");
        self.sessions.insert(id, session);
        self.session_order.push(id);

        // Auto-select if first session
        if self.session_order.len() == 1 {
            self.selected_index = 0;
        }

        self.persist();
        Ok(id)
    }

    /// Remove a session and cancel its pending alerts.
    pub fn remove_session(&mut self, session_id: SessionId) -> Option<WorkSession> {
        if let Some(pos) = self.session_order.iter().position(|&id| id == session_id) {
            self.session_order.remove(pos);

            // Adjust selected index if needed
            if !self.session_order.is_empty() && self.selected_index >= self.session_order.len() {
                self.selected_index = self.session_order.len() - 1;
            }
        }

        let removed = self.sessions.remove(&session_id);
        if removed.is_some() {
            self.scheduler.cancel_session(session_id);
            self.persist();
        }
        removed
    }

    /// Replace a session wholesale, matched by identity.
    ///
    /// Never merges fields: replacing the whole value is what prevents a
    /// stale caller copy from resurrecting overwritten state.
    pub fn update_session(&mut self, session: WorkSession) -> Result<()> {
        let slot = self
            .sessions
            .get_mut(&session.id)
            .ok_or(Error::SessionNotFound { id: session.id })?;
        *slot = session;
        self.persist();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Selection (presentation mediation)
    // ─────────────────────────────────────────────────────────

    /// Get a session by ID
    pub fn get(&self, session_id: SessionId) -> Option<&WorkSession> {
        self.sessions.get(&session_id)
    }

    /// Get the currently selected session
    pub fn selected(&self) -> Option<&WorkSession> {
        self.session_order
            .get(self.selected_index)
            .and_then(|id| self.sessions.get(id))
    }

    /// Get the selected session's ID
    pub fn selected_id(&self) -> Option<SessionId> {
        self.session_order.get(self.selected_index).copied()
    }

    /// Select session by ID
    pub fn select_by_id(&mut self, session_id: SessionId) -> bool {
        if let Some(pos) = self.session_order.iter().position(|&id| id == session_id) {
            self.selected_index = pos;
            true
        } else {
            false
        }
    }

    /// Get number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if there are no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterate over all sessions in order
    pub fn iter(&self) -> impl Iterator<Item = &WorkSession> {
        self.session_order
            .iter()
            .filter_map(|id| self.sessions.get(id))
    }

    // ─────────────────────────────────────────────────────────
    // Clock
    // ─────────────────────────────────────────────────────────

    /// One second of wall-clock time for every active session.
    pub fn tick(&mut self) -> Vec<TimerExpiry> {
        self.elapse_all(1)
    }

    /// Apply a whole suspension in one step.
    ///
    /// Equivalent to having ticked once per second throughout: the same
    /// floors, the same exactly-once expiry signals.
    pub fn reconcile_background(&mut self, elapsed: Duration) -> Vec<TimerExpiry> {
        let secs = elapsed.as_secs();
        if secs == 0 {
            return Vec::new();
        }
        info!(secs, "reconciling background time");
        self.elapse_all(secs)
    }

    fn elapse_all(&mut self, secs: u64) -> Vec<TimerExpiry> {
        let mut expiries = Vec::new();

        let order = &self.session_order;
        let sessions = &mut self.sessions;
        for id in order {
            if let Some(session) = sessions.get_mut(id) {
                for kind in session.timers.elapse(secs) {
                    warn!(session = *id, team = %session.context.team_name, "{}", kind.label());
                    expiries.push(TimerExpiry {
                        session_id: *id,
                        kind,
                    });
                }
            }
        }

        self.persist();
        expiries
    }

    // ─────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────

    /// Record that a team found the fire source.
    pub fn find_source(&mut self, session_id: SessionId) -> Result<()> {
        let now = self.clock.now();
        self.session_mut(session_id)?.find_source(now)?;
        self.persist();
        Ok(())
    }

    /// Submit a pressure reading to begin work at the source.
    ///
    /// On success, alert requests are scheduled for every running timer.
    /// A rejected reading is recorded on the session and persisted so the
    /// pending error survives a surface reload.
    pub fn start_work_at_source(
        &mut self,
        session_id: SessionId,
        pressure_bar: u16,
    ) -> Result<StartWorkOutcome> {
        let now = self.clock.now();
        let (outcome, active_timers) = {
            let session = self.session_mut(session_id)?;
            let outcome = session.start_work_at_source(pressure_bar, now)?;
            (outcome, session.timers.active())
        };

        if outcome == StartWorkOutcome::Started {
            for (kind, secs) in active_timers {
                self.scheduler.schedule(AlertRequest {
                    session_id,
                    kind,
                    after_secs: secs,
                });
            }
        }

        self.persist();
        Ok(outcome)
    }

    /// Record the start of egress.
    pub fn start_egress(&mut self, session_id: SessionId) -> Result<()> {
        let now = self.clock.now();
        self.session_mut(session_id)?.start_egress(now)?;
        self.persist();
        Ok(())
    }

    /// Record the exit address, close the session, and export its record.
    ///
    /// The session leaves the active set and its pending alerts are
    /// cancelled; the returned entry is the only data that outlives it.
    pub fn journal(&mut self, session_id: SessionId, address: &str) -> Result<JournalEntry> {
        let now = self.clock.now();
        let entry = self.session_mut(session_id)?.journal(address, now)?;

        self.scheduler.cancel_session(session_id);
        self.sessions.remove(&session_id);
        if let Some(pos) = self.session_order.iter().position(|&id| id == session_id) {
            self.session_order.remove(pos);
            if !self.session_order.is_empty() && self.selected_index >= self.session_order.len() {
                self.selected_index = self.session_order.len() - 1;
            }
        }

        self.persist();
        Ok(entry)
    }

    /// Consume a session's pending validation error, if any.
    pub fn take_validation_error(
        &mut self,
        session_id: SessionId,
    ) -> Result<Option<airguard_core::ValidationError>> {
        let taken = self.session_mut(session_id)?.take_validation_error();
        if taken.is_some() {
            self.persist();
        }
        Ok(taken)
    }

    // ─────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────

    fn session_mut(&mut self, session_id: SessionId) -> Result<&mut WorkSession> {
        self.sessions
            .get_mut(&session_id)
            .ok_or(Error::SessionNotFound { id: session_id })
    }

    /// Persist the current set, fire-and-forget.
    ///
    /// On a tokio runtime the write happens on the blocking pool so the
    /// tick never waits on I/O; a failure is logged and the transition that
    /// triggered it stands.
    fn persist(&self) {
        let snapshot: Vec<WorkSession> = self.iter().cloned().collect();
        let store = Arc::clone(&self.store);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    if let Err(e) = store.save(&snapshot) {
                        warn!("failed to persist session set: {e}");
                    }
                });
            }
            Err(_) => {
                if let Err(e) = store.save(&snapshot) {
                    warn!("failed to persist session set: {e}");
                }
            }
        }
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.session_order)
            .field("selected_index", &self.selected_index)
            .finish()
    }
}
