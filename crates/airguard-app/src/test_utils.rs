//! Test utilities for session and registry types
//!
//! Provides a controllable clock, a recording alert scheduler, an in-memory
//! store, and helpers for building operation contexts.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, TimeZone};

use airguard_core::prelude::*;
use airguard_core::{AlertKind, ApparatusKind, OperationContext, TeamMember, WorkMode};

use crate::alerts::{AlertRequest, AlertScheduler};
use crate::clock::Clock;
use crate::session::{SessionId, WorkSession};
use crate::store::SessionStore;

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FakeClock {
    now: Mutex<DateTime<Local>>,
}

impl FakeClock {
    /// Starts at a fixed, arbitrary instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Local.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()),
        }
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::minutes(minutes);
    }

    pub fn advance_seconds(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(seconds);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}

/// Scheduler that records every schedule and cancel it sees.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    inner: Mutex<RecordingState>,
}

#[derive(Debug, Default)]
struct RecordingState {
    pending: HashMap<SessionId, Vec<AlertRequest>>,
    scheduled: Vec<AlertRequest>,
    cancelled: Vec<(SessionId, AlertKind)>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All schedule calls observed, in order.
    pub fn scheduled(&self) -> Vec<AlertRequest> {
        self.inner.lock().unwrap().scheduled.clone()
    }

    /// Pending alerts removed by `cancel_session`, one per `(session, kind)`.
    pub fn cancelled(&self) -> Vec<(SessionId, AlertKind)> {
        self.inner.lock().unwrap().cancelled.clone()
    }

    /// Number of alerts currently pending for a session.
    pub fn pending_count(&self, session_id: SessionId) -> usize {
        self.inner
            .lock()
            .unwrap()
            .pending
            .get(&session_id)
            .map_or(0, Vec::len)
    }
}

impl AlertScheduler for RecordingScheduler {
    fn schedule(&self, request: AlertRequest) {
        let mut state = self.inner.lock().unwrap();
        let pending = state.pending.entry(request.session_id).or_default();
        pending.retain(|r| r.kind != request.kind);
        pending.push(request);
        state.scheduled.push(request);
    }

    fn cancel_session(&self, session_id: SessionId) {
        let mut state = self.inner.lock().unwrap();
        let removed = state.pending.remove(&session_id).unwrap_or_default();
        state
            .cancelled
            .extend(removed.into_iter().map(|r| (r.session_id, r.kind)));
    }
}

/// In-memory store, recording the last saved set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<Vec<WorkSession>>,
    save_count: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with sessions, as if left behind by a previous run.
    pub fn with_sessions(sessions: Vec<WorkSession>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            save_count: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }

    pub fn stored(&self) -> Vec<WorkSession> {
        self.sessions.lock().unwrap().clone()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, sessions: &[WorkSession]) -> Result<()> {
        *self.sessions.lock().unwrap() = sessions.to_vec();
        *self.save_count.lock().unwrap() += 1;
        Ok(())
    }

    fn load(&self) -> Result<Vec<WorkSession>> {
        Ok(self.sessions.lock().unwrap().clone())
    }
}

/// A two-member team on a Drager PSS3000, every member reading `pressure`.
pub fn test_context(team_name: &str, pressure: u16) -> OperationContext {
    test_context_with_members(
        team_name,
        vec![
            TeamMember::new(1, "A. Petrenko", Some(pressure)),
            TeamMember::new(2, "I. Kovalenko", Some(pressure)),
        ],
    )
}

/// A team on a Drager PSS3000 with full control over the roster.
pub fn test_context_with_members(team_name: &str, members: Vec<TeamMember>) -> OperationContext {
    OperationContext {
        team_name: team_name.to_string(),
        entry_time: None,
        device: ApparatusKind::DragerPss3000.profile(),
        members,
        work_mode: WorkMode::Average,
    }
}
