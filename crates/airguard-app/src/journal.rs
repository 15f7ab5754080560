//! Completed-operation record exported at journaling
//!
//! The only session data that outlives the process. Storage and display of
//! journal entries belong to external collaborators; this type is the
//! lossless hand-off.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use airguard_core::{DeviceProfile, OperationalWarning, TeamMember, WorkMode};

use crate::session::WorkSession;

/// Snapshot of a finished operation, built when the exit address is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub team_name: String,
    pub work_address: String,

    pub device: DeviceProfile,
    /// Active roster at entry
    pub members: Vec<TeamMember>,
    pub work_mode: WorkMode,

    // ─────────────────────────────────────────────────────────
    // Timeline
    // ─────────────────────────────────────────────────────────
    pub entry_time: Option<DateTime<Local>>,
    pub source_found_at: Option<DateTime<Local>>,
    pub work_started_at: Option<DateTime<Local>>,
    pub egress_started_at: Option<DateTime<Local>>,
    pub journaled_at: DateTime<Local>,

    // ─────────────────────────────────────────────────────────
    // Air-Budget Summary
    // ─────────────────────────────────────────────────────────
    pub initial_min_pressure_bar: u16,
    pub pressure_at_source_bar: Option<u16>,
    pub search_time_min: u32,
    pub work_time_at_source_min: u32,
    pub protection_time_min: u32,
    pub actual_consumption_lpm: f64,

    /// Conditions raised during the operation, for the debrief
    pub warnings: Vec<OperationalWarning>,
}

impl JournalEntry {
    pub fn from_session(session: &WorkSession, journaled_at: DateTime<Local>) -> Self {
        Self {
            team_name: session.context.team_name.clone(),
            work_address: session.work_address.clone().unwrap_or_default(),
            device: session.context.device.clone(),
            members: session.context.active_members().cloned().collect(),
            work_mode: session.context.work_mode,
            entry_time: session.context.entry_time,
            source_found_at: session.source_found_at,
            work_started_at: session.work_started_at,
            egress_started_at: session.egress_started_at,
            journaled_at,
            initial_min_pressure_bar: session.initial_min_pressure_bar,
            pressure_at_source_bar: session.pressure_at_source_bar,
            search_time_min: session.search_time_min,
            work_time_at_source_min: session.work_time_at_source_min,
            protection_time_min: session.protection_time_min,
            actual_consumption_lpm: session.actual_consumption_lpm,
            warnings: session.warnings.clone(),
        }
    }
}
