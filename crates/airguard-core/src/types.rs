//! Domain types shared across all AirGuard crates

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::device::DeviceProfile;

// ─────────────────────────────────────────────────────────
// Operation Phase
// ─────────────────────────────────────────────────────────

/// Lifecycle phase of a team working in the hazard zone.
///
/// Phases only ever advance; the single terminal phase is `Journaled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationPhase {
    /// Team has entered the hazard zone and is moving in
    #[default]
    Entered,

    /// Team is searching for the fire source
    SearchingForSource,

    /// Team is working at the fire source
    WorkingAtSource,

    /// Team has started egress from the hazard zone
    ExitingZone,

    /// Exit recorded with a work address; the session is closed
    Journaled,
}

impl OperationPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationPhase::Journaled)
    }

    /// Short human-readable label for logs and status displays.
    pub fn label(&self) -> &'static str {
        match self {
            OperationPhase::Entered => "Entered",
            OperationPhase::SearchingForSource => "SearchingForSource",
            OperationPhase::WorkingAtSource => "WorkingAtSource",
            OperationPhase::ExitingZone => "ExitingZone",
            OperationPhase::Journaled => "Journaled",
        }
    }
}

// ─────────────────────────────────────────────────────────
// Work Mode
// ─────────────────────────────────────────────────────────

/// Physical load the team is working under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkMode {
    /// Average load (search, reconnaissance)
    #[default]
    Average,

    /// Heavy load (evacuating a victim) — doubles air consumption
    Heavy,
}

impl WorkMode {
    /// Air consumption under this load, l/min.
    pub fn consumption_lpm(&self) -> f64 {
        match self {
            WorkMode::Average => 40.0,
            WorkMode::Heavy => 80.0,
        }
    }
}

// ─────────────────────────────────────────────────────────
// Team Members
// ─────────────────────────────────────────────────────────

/// Role of a member within the team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TeamRole {
    #[default]
    Firefighter,
    SquadLeader,
    SafetyPost,
}

impl TeamRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            TeamRole::Firefighter => "Firefighter",
            TeamRole::SquadLeader => "Squad leader",
            TeamRole::SafetyPost => "Safety post",
        }
    }
}

/// One member of a team, as seeded from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: u64,
    pub full_name: String,
    pub role: TeamRole,

    /// Cylinder pressure read off the gauge at entry, bar.
    /// `None` when the reading was missing or unparseable.
    pub pressure_bar: Option<u16>,

    pub is_active: bool,
}

impl TeamMember {
    pub fn new(id: u64, full_name: impl Into<String>, pressure_bar: Option<u16>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            role: TeamRole::default(),
            pressure_bar,
            is_active: true,
        }
    }
}

/// Lowest pressure among active members with a usable reading.
///
/// Only active members with a parseable pressure contribute; a team with
/// no usable readings yields `None`.
pub fn team_min_pressure(members: &[TeamMember]) -> Option<u16> {
    members
        .iter()
        .filter(|m| m.is_active)
        .filter_map(|m| m.pressure_bar)
        .min()
}

// ─────────────────────────────────────────────────────────
// Operation Context
// ─────────────────────────────────────────────────────────

/// Immutable facts about one team's commitment to the hazard zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationContext {
    /// Roster identity of the team. At most one active session per name.
    pub team_name: String,

    /// When the team crossed into the hazard zone
    pub entry_time: Option<DateTime<Local>>,

    /// Apparatus worn by the team
    pub device: DeviceProfile,

    /// Team roster at entry (read-only; the engine never mutates it)
    pub members: Vec<TeamMember>,

    pub work_mode: WorkMode,
}

impl OperationContext {
    /// Lowest usable pressure across the active roster, bar.
    pub fn min_pressure_bar(&self) -> Option<u16> {
        team_min_pressure(&self.members)
    }

    pub fn active_members(&self) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(|m| m.is_active)
    }
}

// ─────────────────────────────────────────────────────────
// Validation Errors & Operational Warnings (data, not control flow)
// ─────────────────────────────────────────────────────────

/// A user-correctable rejection of a work-start pressure reading.
///
/// Stored on the session until a surface acknowledges it, so reporting
/// does not depend on view lifecycle and each violation surfaces once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    /// Entered pressure exceeds the lowest gauge in the team
    PressureAboveTeamMinimum { entered_bar: u16, team_min_bar: u16 },

    /// Entered pressure is below the apparatus work-start threshold
    PressureBelowDeviceThreshold { entered_bar: u16, threshold_bar: u16 },
}

impl ValidationError {
    pub fn message(&self) -> String {
        match self {
            ValidationError::PressureAboveTeamMinimum {
                entered_bar,
                team_min_bar,
            } => format!(
                "pressure at source ({entered_bar} bar) exceeds team minimum ({team_min_bar} bar)"
            ),
            ValidationError::PressureBelowDeviceThreshold {
                entered_bar,
                threshold_bar,
            } => format!(
                "pressure at source ({entered_bar} bar) is below the device threshold ({threshold_bar} bar)"
            ),
        }
    }
}

/// Non-blocking condition surfaced to the safety officer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OperationalWarning {
    /// Measured consumption exceeded twice the rated value; may indicate
    /// equipment leakage or overexertion. Advisory only.
    ConsumptionAnomaly { measured_lpm: f64, ceiling_lpm: f64 },

    /// The team is already past the mandatory-egress pressure; computed
    /// work time at the source is zero.
    PastEgressThreshold {
        pressure_at_source_bar: u16,
        exit_start_pressure_bar: u16,
    },
}

impl OperationalWarning {
    pub fn message(&self) -> String {
        match self {
            OperationalWarning::ConsumptionAnomaly {
                measured_lpm,
                ceiling_lpm,
            } => format!(
                "measured air consumption {measured_lpm:.1} l/min exceeds {ceiling_lpm:.1} l/min"
            ),
            OperationalWarning::PastEgressThreshold {
                pressure_at_source_bar,
                exit_start_pressure_bar,
            } => format!(
                "pressure at source {pressure_at_source_bar} bar is at or below the egress threshold {exit_start_pressure_bar} bar"
            ),
        }
    }
}
