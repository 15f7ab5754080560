//! Per-team session state — phase machine, timers, and air-budget figures.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use airguard_core::prelude::*;
use airguard_core::{
    actual_air_consumption, critical_pressure, evacuation_time_with_victim, exit_start_pressure,
    hood_pressure, protection_time, work_time_minutes_floored, OperationContext, OperationPhase,
    OperationalWarning, ValidationError,
};

use crate::journal::JournalEntry;

use super::timers::SessionTimers;
use super::{next_session_id, SessionId};

/// Result of a work-start attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartWorkOutcome {
    /// Guard passed; the session advanced to `WorkingAtSource`
    Started,

    /// Guard failed; the session stays in `SearchingForSource` and the
    /// rejection is recorded on `pending_validation_error` for the
    /// operator to correct and retry
    Rejected(ValidationError),
}

/// One team's mutable safety state while inside the hazard zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    /// Unique session identifier
    pub id: SessionId,

    /// Team, apparatus, roster, and entry facts
    pub context: OperationContext,

    /// Current phase; advances forward only
    pub phase: OperationPhase,

    /// Live countdowns, ticked by the registry clock
    pub timers: SessionTimers,

    // ─────────────────────────────────────────────────────────
    // Pressure Readings
    // ─────────────────────────────────────────────────────────
    /// Lowest gauge across the active team, bar
    pub min_pressure_bar: u16,

    /// Team minimum captured at zone entry, bar
    pub initial_min_pressure_bar: u16,

    /// Reading entered when work at the source began, bar
    pub pressure_at_source_bar: Option<u16>,

    /// Estimated real consumption; rated value until measured, l/min
    pub actual_consumption_lpm: f64,

    // ─────────────────────────────────────────────────────────
    // Derived Air-Budget Figures
    // ─────────────────────────────────────────────────────────
    /// Nominal operating time down to the reserve, minutes
    pub protection_time_min: u32,

    /// Margin-reassessment midpoint, bar
    pub critical_pressure_bar: u16,

    /// Self-rescue hood threshold from the critical midpoint, bar
    pub hood_pressure_bar: u16,

    /// Time available to evacuate a victim, minutes
    pub evacuation_time_with_victim_min: u32,

    /// Pressure spent traveling to the source, bar
    pub pressure_on_path_bar: u16,

    /// Working time available at the source before mandatory egress, minutes
    pub work_time_at_source_min: u32,

    /// Pressure at which egress must begin, bar
    pub exit_start_pressure_bar: u16,

    /// Whole minutes spent searching for the source
    pub search_time_min: u32,

    // ─────────────────────────────────────────────────────────
    // Timing
    // ─────────────────────────────────────────────────────────
    /// When this session was created
    pub created_at: DateTime<Local>,

    /// When the fire source was found
    pub source_found_at: Option<DateTime<Local>>,

    /// When work at the source began
    pub work_started_at: Option<DateTime<Local>>,

    /// When egress began
    pub egress_started_at: Option<DateTime<Local>>,

    // ─────────────────────────────────────────────────────────
    // Reportable Conditions (data, not control flow)
    // ─────────────────────────────────────────────────────────
    /// Unacknowledged work-start rejection, if any
    pub pending_validation_error: Option<ValidationError>,

    /// Non-blocking conditions surfaced to the safety officer
    pub warnings: Vec<OperationalWarning>,

    /// Exit address, set only at journaling
    pub work_address: Option<String>,
}

impl WorkSession {
    /// Create a session for a team committing to the hazard zone.
    ///
    /// Captures the team minimum pressure and computes the entry-time
    /// air-budget figures. Fails when the device profile is invalid or no
    /// active member has a usable pressure reading.
    pub fn new(
        context: OperationContext,
        communication_secs: u64,
        now: DateTime<Local>,
    ) -> Result<Self> {
        context.device.validate()?;
        let min_pressure = context
            .min_pressure_bar()
            .ok_or(Error::NoPressureReadings)?;

        let device = &context.device;
        let min = f64::from(min_pressure);
        let critical = critical_pressure(min, device.reserve_pressure_bar);
        let hood = hood_pressure(min, critical, false, device.reserve_pressure_bar);

        Ok(Self {
            id: next_session_id(),
            phase: OperationPhase::Entered,
            timers: SessionTimers::new(communication_secs),
            min_pressure_bar: min_pressure,
            initial_min_pressure_bar: min_pressure,
            pressure_at_source_bar: None,
            actual_consumption_lpm: device.nominal_consumption_lpm,
            protection_time_min: protection_time(min, device),
            critical_pressure_bar: floor_bar(critical),
            hood_pressure_bar: floor_bar(hood),
            evacuation_time_with_victim_min: evacuation_time_with_victim(
                min,
                device,
                context.work_mode,
            ),
            pressure_on_path_bar: 0,
            work_time_at_source_min: 0,
            exit_start_pressure_bar: 0,
            search_time_min: 0,
            created_at: now,
            source_found_at: None,
            work_started_at: None,
            egress_started_at: None,
            pending_validation_error: None,
            warnings: Vec::new(),
            work_address: None,
            context,
        })
    }

    // ─────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────

    /// The team found the fire source: `Entered → SearchingForSource`.
    ///
    /// Records the find time and the whole minutes spent searching since
    /// zone entry (session creation when no entry time was recorded).
    pub fn find_source(&mut self, now: DateTime<Local>) -> Result<()> {
        self.require_phase(OperationPhase::Entered, "record found source")?;

        let search_started = self.context.entry_time.unwrap_or(self.created_at);
        self.search_time_min = (now - search_started).num_minutes().max(0) as u32;
        self.source_found_at = Some(now);
        self.phase = OperationPhase::SearchingForSource;

        info!(
            session = self.id,
            team = %self.context.team_name,
            search_time_min = self.search_time_min,
            "fire source found"
        );
        Ok(())
    }

    /// Begin work at the source: `SearchingForSource → WorkingAtSource`.
    ///
    /// The entered pressure must not exceed the team minimum and must be at
    /// or above the apparatus work-start threshold. A rejected reading
    /// leaves the phase unchanged and records the violation on
    /// `pending_validation_error`; the operator corrects it and retries.
    pub fn start_work_at_source(
        &mut self,
        pressure_bar: u16,
        now: DateTime<Local>,
    ) -> Result<StartWorkOutcome> {
        self.require_phase(OperationPhase::SearchingForSource, "start work at source")?;

        if pressure_bar > self.min_pressure_bar {
            return Ok(self.reject(ValidationError::PressureAboveTeamMinimum {
                entered_bar: pressure_bar,
                team_min_bar: self.min_pressure_bar,
            }));
        }

        let threshold = self.context.device.work_start_threshold_bar();
        if pressure_bar < threshold {
            return Ok(self.reject(ValidationError::PressureBelowDeviceThreshold {
                entered_bar: pressure_bar,
                threshold_bar: threshold,
            }));
        }

        self.pending_validation_error = None;
        self.initial_min_pressure_bar = self.min_pressure_bar;
        self.pressure_at_source_bar = Some(pressure_bar);
        self.work_started_at = Some(now);
        self.phase = OperationPhase::WorkingAtSource;

        self.recompute_work_figures(pressure_bar);

        info!(
            session = self.id,
            team = %self.context.team_name,
            pressure_at_source = pressure_bar,
            work_time_min = self.work_time_at_source_min,
            exit_start_pressure = self.exit_start_pressure_bar,
            "work at source started"
        );
        Ok(StartWorkOutcome::Started)
    }

    /// The team starts leaving the zone: `WorkingAtSource → ExitingZone`.
    pub fn start_egress(&mut self, now: DateTime<Local>) -> Result<()> {
        self.require_phase(OperationPhase::WorkingAtSource, "start egress")?;
        self.egress_started_at = Some(now);
        self.phase = OperationPhase::ExitingZone;

        info!(session = self.id, team = %self.context.team_name, "egress started");
        Ok(())
    }

    /// Record the exit address and close the session:
    /// `ExitingZone → Journaled`.
    ///
    /// Returns the completed record for the journal; the registry removes
    /// the session from the active set.
    pub fn journal(&mut self, address: &str, now: DateTime<Local>) -> Result<JournalEntry> {
        self.require_phase(OperationPhase::ExitingZone, "journal")?;

        let address = address.trim();
        if address.is_empty() {
            return Err(Error::EmptyWorkAddress);
        }

        self.work_address = Some(address.to_string());
        self.phase = OperationPhase::Journaled;

        info!(session = self.id, team = %self.context.team_name, %address, "session journaled");
        Ok(JournalEntry::from_session(self, now))
    }

    // ─────────────────────────────────────────────────────────
    // Reporting
    // ─────────────────────────────────────────────────────────

    /// Consume the pending validation error, if any.
    ///
    /// Each violation is surfaced exactly once: polling after the take
    /// returns `None` until the next offending attempt.
    pub fn take_validation_error(&mut self) -> Option<ValidationError> {
        self.pending_validation_error.take()
    }

    // ─────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────

    fn reject(&mut self, error: ValidationError) -> StartWorkOutcome {
        warn!(
            session = self.id,
            team = %self.context.team_name,
            "work start rejected: {}",
            error.message()
        );
        self.pending_validation_error = Some(error);
        StartWorkOutcome::Rejected(error)
    }

    /// Recompute the at-source figures and rearm the countdowns from a
    /// validated pressure reading.
    fn recompute_work_figures(&mut self, pressure_bar: u16) {
        let device = &self.context.device;
        let min = f64::from(self.min_pressure_bar);
        let at_source = f64::from(pressure_bar);

        let estimate = actual_air_consumption(
            f64::from(self.initial_min_pressure_bar),
            at_source,
            f64::from(self.search_time_min),
            device,
        );
        if estimate.anomaly {
            let warning = OperationalWarning::ConsumptionAnomaly {
                measured_lpm: estimate.rate_lpm,
                ceiling_lpm: device.nominal_consumption_lpm
                    * airguard_core::CONSUMPTION_CEILING_FACTOR,
            };
            warn!(session = self.id, "{}", warning.message());
            self.warnings.push(warning);
        }
        self.actual_consumption_lpm = estimate.rate_lpm;

        // Guard ensures pressure ≤ team minimum, so this cannot underflow.
        self.pressure_on_path_bar = self.min_pressure_bar - pressure_bar;
        self.exit_start_pressure_bar = floor_bar(exit_start_pressure(min, at_source, device));

        let pressure_difference =
            i64::from(pressure_bar) - i64::from(self.exit_start_pressure_bar);
        self.work_time_at_source_min = if pressure_difference > 0 {
            work_time_minutes_floored(
                device.cylinder_count,
                device.cylinder_volume_l,
                pressure_difference as f64,
                self.actual_consumption_lpm,
            )
        } else {
            // Already past the mandatory-egress threshold: an operational
            // alert condition, not a programming error.
            let warning = OperationalWarning::PastEgressThreshold {
                pressure_at_source_bar: pressure_bar,
                exit_start_pressure_bar: self.exit_start_pressure_bar,
            };
            warn!(session = self.id, "{}", warning.message());
            self.warnings.push(warning);
            0
        };

        let remaining_pressure = at_source - device.reserve_pressure_bar;
        let remaining_min = if remaining_pressure <= 0.0 {
            // Egress must be immediate
            0
        } else {
            work_time_minutes_floored(
                device.cylinder_count,
                device.cylinder_volume_l,
                remaining_pressure,
                self.actual_consumption_lpm,
            )
        };

        self.timers.exit_secs = u64::from(self.work_time_at_source_min) * 60;
        self.timers.remaining_secs = u64::from(remaining_min) * 60;
    }

    fn require_phase(&self, expected: OperationPhase, action: &'static str) -> Result<()> {
        if self.phase == expected {
            return Ok(());
        }
        // A trigger on a journaled session is a programming error: loud in
        // debug builds, a plain error in release.
        debug_assert!(
            !self.phase.is_terminal(),
            "{action} attempted on journaled session {}",
            self.id
        );
        Err(Error::invalid_transition(self.phase.label(), action))
    }
}

/// Truncate a non-negative bar value to a whole-number gauge reading.
fn floor_bar(value: f64) -> u16 {
    value.clamp(0.0, f64::from(u16::MAX)).floor() as u16
}
