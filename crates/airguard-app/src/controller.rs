//! Per-surface session controller
//!
//! A surface (screen, status panel) holds one controller per displayed
//! session. The controller owns nothing but a disposable snapshot: reads go
//! through `refresh()`, writes go through the registry's transition methods.
//! It never mutates its snapshot and merges it back — that path loses
//! concurrent tick updates.

use std::sync::MutexGuard;

use chrono::{DateTime, Local};

use airguard_core::prelude::*;
use airguard_core::{OperationPhase, OperationalWarning, ValidationError};

use crate::journal::JournalEntry;
use crate::registry::{SessionRegistry, SharedRegistry};
use crate::session::{SessionId, SessionTimers, StartWorkOutcome, WorkSession};

/// Read-only display state of one session, cloned out of the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkSnapshot {
    pub session_id: SessionId,
    pub team_name: String,
    pub phase: OperationPhase,
    pub timers: SessionTimers,

    pub min_pressure_bar: u16,
    pub pressure_at_source_bar: Option<u16>,
    pub actual_consumption_lpm: f64,

    pub protection_time_min: u32,
    pub critical_pressure_bar: u16,
    pub hood_pressure_bar: u16,
    pub evacuation_time_with_victim_min: u32,
    pub pressure_on_path_bar: u16,
    pub work_time_at_source_min: u32,
    pub exit_start_pressure_bar: u16,
    pub search_time_min: u32,

    pub entry_time: Option<DateTime<Local>>,
    pub source_found_at: Option<DateTime<Local>>,

    pub pending_validation_error: Option<ValidationError>,
    pub warnings: Vec<OperationalWarning>,
}

impl From<&WorkSession> for WorkSnapshot {
    fn from(session: &WorkSession) -> Self {
        Self {
            session_id: session.id,
            team_name: session.context.team_name.clone(),
            phase: session.phase,
            timers: session.timers.clone(),
            min_pressure_bar: session.min_pressure_bar,
            pressure_at_source_bar: session.pressure_at_source_bar,
            actual_consumption_lpm: session.actual_consumption_lpm,
            protection_time_min: session.protection_time_min,
            critical_pressure_bar: session.critical_pressure_bar,
            hood_pressure_bar: session.hood_pressure_bar,
            evacuation_time_with_victim_min: session.evacuation_time_with_victim_min,
            pressure_on_path_bar: session.pressure_on_path_bar,
            work_time_at_source_min: session.work_time_at_source_min,
            exit_start_pressure_bar: session.exit_start_pressure_bar,
            search_time_min: session.search_time_min,
            entry_time: session.context.entry_time,
            source_found_at: session.source_found_at,
            pending_validation_error: session.pending_validation_error,
            warnings: session.warnings.clone(),
        }
    }
}

/// Read-through view over one session in the shared registry.
pub struct SessionController {
    registry: SharedRegistry,
    session_id: SessionId,
    snapshot: Option<WorkSnapshot>,
}

impl SessionController {
    pub fn new(registry: SharedRegistry, session_id: SessionId) -> Self {
        Self {
            registry,
            session_id,
            snapshot: None,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Pull a fresh snapshot from the registry.
    ///
    /// `None` means the session left the active set (journaled or removed).
    pub fn refresh(&mut self) -> Option<&WorkSnapshot> {
        let snapshot = {
            let registry = self.lock();
            registry.get(self.session_id).map(WorkSnapshot::from)
        };
        self.snapshot = snapshot;
        self.snapshot.as_ref()
    }

    /// The last pulled snapshot, possibly stale. Call [`refresh`] before
    /// rendering.
    ///
    /// [`refresh`]: SessionController::refresh
    pub fn snapshot(&self) -> Option<&WorkSnapshot> {
        self.snapshot.as_ref()
    }

    // ─────────────────────────────────────────────────────────
    // Transition Submission
    // ─────────────────────────────────────────────────────────

    pub fn find_source(&mut self) -> Result<()> {
        let result = self.lock().find_source(self.session_id);
        self.refresh();
        result
    }

    pub fn start_work_at_source(&mut self, pressure_bar: u16) -> Result<StartWorkOutcome> {
        let result = self.lock().start_work_at_source(self.session_id, pressure_bar);
        self.refresh();
        result
    }

    pub fn start_egress(&mut self) -> Result<()> {
        let result = self.lock().start_egress(self.session_id);
        self.refresh();
        result
    }

    pub fn journal(&mut self, address: &str) -> Result<JournalEntry> {
        let result = self.lock().journal(self.session_id, address);
        self.refresh();
        result
    }

    /// Acknowledge and consume the pending validation error, if any.
    pub fn take_validation_error(&mut self) -> Result<Option<ValidationError>> {
        let result = self.lock().take_validation_error(self.session_id);
        self.refresh();
        result
    }

    fn lock(&self) -> MutexGuard<'_, SessionRegistry> {
        // A poisoning panic cannot leave a half-applied transition behind:
        // session methods validate before mutating. Recover and continue.
        self.registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
