//! State-machine tests for WorkSession

use airguard_core::prelude::*;
use airguard_core::{
    DeviceProfile, OperationContext, OperationPhase, OperationalWarning, TeamMember,
    ValidationError, WorkMode,
};

use crate::clock::Clock;
use crate::test_utils::{test_context, test_context_with_members, FakeClock};

use super::{StartWorkOutcome, WorkSession};

fn new_session(context: OperationContext, clock: &FakeClock) -> WorkSession {
    WorkSession::new(context, 600, clock.now()).unwrap()
}

/// A context on a hypothetical single 6.8 L cylinder apparatus.
fn context_68l(team_min: u16) -> OperationContext {
    let mut context = test_context("Link 1", team_min);
    context.device = DeviceProfile {
        cylinder_count: 1,
        cylinder_volume_l: 6.8,
        reserve_pressure_bar: 50.0,
        nominal_consumption_lpm: 40.0,
    };
    context
}

#[test]
fn test_new_session_captures_entry_figures() {
    let clock = FakeClock::new();
    let session = new_session(context_68l(300), &clock);

    assert_eq!(session.phase, OperationPhase::Entered);
    assert_eq!(session.min_pressure_bar, 300);
    assert_eq!(session.initial_min_pressure_bar, 300);
    // (1 × 6.8 × (300 − 50)) / 40 = 42.5 → 42 minutes floored
    assert_eq!(session.protection_time_min, 42);
    assert_eq!(session.critical_pressure_bar, 125);
    // Self-rescue hood from the critical midpoint: 2 × 175 + 50
    assert_eq!(session.hood_pressure_bar, 400);
    assert_eq!(session.actual_consumption_lpm, 40.0);
    assert_eq!(session.timers.communication_secs, 600);
    assert_eq!(session.timers.exit_secs, 0);
    assert_eq!(session.timers.remaining_secs, 0);
}

#[test]
fn test_new_session_requires_pressure_readings() {
    let clock = FakeClock::new();
    let context = test_context_with_members(
        "Link 1",
        vec![TeamMember::new(1, "A. Petrenko", None)],
    );
    let result = WorkSession::new(context, 600, clock.now());
    assert!(matches!(result, Err(Error::NoPressureReadings)));
}

#[test]
fn test_find_source_records_search_time() {
    let clock = FakeClock::new();
    let mut context = test_context("Link 1", 300);
    context.entry_time = Some(clock.now());

    let mut session = new_session(context, &clock);
    clock.advance_minutes(12);
    session.find_source(clock.now()).unwrap();

    assert_eq!(session.phase, OperationPhase::SearchingForSource);
    assert_eq!(session.search_time_min, 12);
    assert_eq!(session.source_found_at, Some(clock.now()));
}

#[test]
fn test_find_source_falls_back_to_creation_time() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);
    assert!(session.context.entry_time.is_none());

    clock.advance_minutes(7);
    session.find_source(clock.now()).unwrap();
    assert_eq!(session.search_time_min, 7);
}

#[test]
fn test_start_work_rejects_pressure_above_team_minimum() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);
    session.find_source(clock.now()).unwrap();

    let outcome = session.start_work_at_source(320, clock.now()).unwrap();
    assert_eq!(
        outcome,
        StartWorkOutcome::Rejected(ValidationError::PressureAboveTeamMinimum {
            entered_bar: 320,
            team_min_bar: 300,
        })
    );

    // Never advances; the operator corrects the reading and retries.
    assert_eq!(session.phase, OperationPhase::SearchingForSource);
    assert!(session.pending_validation_error.is_some());
    assert_eq!(session.timers.exit_secs, 0);
}

#[test]
fn test_start_work_rejects_pressure_below_device_threshold() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);
    session.find_source(clock.now()).unwrap();

    // Drager class: 200 bar floor
    let outcome = session.start_work_at_source(190, clock.now()).unwrap();
    assert_eq!(
        outcome,
        StartWorkOutcome::Rejected(ValidationError::PressureBelowDeviceThreshold {
            entered_bar: 190,
            threshold_bar: 200,
        })
    );
    assert_eq!(session.phase, OperationPhase::SearchingForSource);
}

#[test]
fn test_validation_error_consumed_once() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);
    session.find_source(clock.now()).unwrap();
    session.start_work_at_source(320, clock.now()).unwrap();

    assert!(session.take_validation_error().is_some());
    assert!(session.take_validation_error().is_none());

    // A fresh offending attempt surfaces a fresh error.
    session.start_work_at_source(190, clock.now()).unwrap();
    assert!(session.take_validation_error().is_some());
}

#[test]
fn test_start_work_computes_budget_figures() {
    let clock = FakeClock::new();
    let mut context = test_context("Link 1", 300);
    context.entry_time = Some(clock.now());
    let mut session = new_session(context, &clock);

    clock.advance_minutes(10);
    session.find_source(clock.now()).unwrap();

    let outcome = session.start_work_at_source(220, clock.now()).unwrap();
    assert_eq!(outcome, StartWorkOutcome::Started);
    assert_eq!(session.phase, OperationPhase::WorkingAtSource);

    // (300 − 220) + 50 = 130 bar
    assert_eq!(session.exit_start_pressure_bar, 130);
    assert_eq!(session.pressure_on_path_bar, 80);
    assert_eq!(session.pressure_at_source_bar, Some(220));

    // 80 bar spent over 10 min on a 6.0 L cylinder: 48 l/min, within clamp
    assert_eq!(session.actual_consumption_lpm, 48.0);
    assert!(session.warnings.is_empty());

    // work: (6.0 × (220 − 130)) / 48 = 11.25 → 11 min; exit timer armed
    assert_eq!(session.work_time_at_source_min, 11);
    assert_eq!(session.timers.exit_secs, 11 * 60);

    // remaining: (6.0 × (220 − 50)) / 48 = 21.25 → 21 min
    assert_eq!(session.timers.remaining_secs, 21 * 60);
}

#[test]
fn test_start_work_flags_consumption_anomaly() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);
    // Found immediately: search time 0 → effective 0.5 min
    session.find_source(clock.now()).unwrap();

    session.start_work_at_source(200, clock.now()).unwrap();

    // 100 bar in half a minute is 1200 l/min raw — clamped to 2× nominal
    assert_eq!(session.actual_consumption_lpm, 80.0);
    assert!(session
        .warnings
        .iter()
        .any(|w| matches!(w, OperationalWarning::ConsumptionAnomaly { .. })));
    // Advisory only: the transition still happened.
    assert_eq!(session.phase, OperationPhase::WorkingAtSource);
}

#[test]
fn test_start_work_past_egress_threshold_warns_with_zero_work_time() {
    let clock = FakeClock::new();
    let mut context = test_context("Link 1", 400);
    context.entry_time = Some(clock.now());
    let mut session = new_session(context, &clock);

    clock.advance_minutes(20);
    session.find_source(clock.now()).unwrap();

    // exit start = (400 − 210) + 50 = 240 > 210: already past the threshold
    session.start_work_at_source(210, clock.now()).unwrap();

    assert_eq!(session.exit_start_pressure_bar, 240);
    assert_eq!(session.work_time_at_source_min, 0);
    assert_eq!(session.timers.exit_secs, 0);
    assert!(session
        .warnings
        .iter()
        .any(|w| matches!(w, OperationalWarning::PastEgressThreshold { .. })));
    // Not an error: the phase advanced and the remaining timer still runs.
    assert_eq!(session.phase, OperationPhase::WorkingAtSource);
    assert!(session.timers.remaining_secs > 0);
}

#[test]
fn test_full_lifecycle_to_journal() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);

    clock.advance_minutes(5);
    session.find_source(clock.now()).unwrap();
    clock.advance_minutes(2);
    session.start_work_at_source(260, clock.now()).unwrap();
    clock.advance_minutes(8);
    session.start_egress(clock.now()).unwrap();
    assert_eq!(session.phase, OperationPhase::ExitingZone);

    clock.advance_minutes(6);
    let entry = session.journal("12 Shevchenka St", clock.now()).unwrap();

    assert_eq!(session.phase, OperationPhase::Journaled);
    assert_eq!(session.work_address.as_deref(), Some("12 Shevchenka St"));
    assert_eq!(entry.team_name, "Link 1");
    assert_eq!(entry.work_address, "12 Shevchenka St");
    assert_eq!(entry.journaled_at, clock.now());
    assert_eq!(entry.members.len(), 2);
    assert_eq!(entry.pressure_at_source_bar, Some(260));
}

#[test]
fn test_journal_rejects_blank_address() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);
    session.find_source(clock.now()).unwrap();
    session.start_work_at_source(260, clock.now()).unwrap();
    session.start_egress(clock.now()).unwrap();

    let result = session.journal("  \t ", clock.now());
    assert!(matches!(result, Err(Error::EmptyWorkAddress)));
    assert_eq!(session.phase, OperationPhase::ExitingZone);
    assert!(session.work_address.is_none());
}

#[test]
fn test_phase_never_regresses() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);

    // Out-of-order triggers are rejected without touching state.
    assert!(matches!(
        session.start_egress(clock.now()),
        Err(Error::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.start_work_at_source(260, clock.now()),
        Err(Error::InvalidTransition { .. })
    ));
    assert_eq!(session.phase, OperationPhase::Entered);

    session.find_source(clock.now()).unwrap();
    assert!(matches!(
        session.find_source(clock.now()),
        Err(Error::InvalidTransition { .. })
    ));
    assert_eq!(session.phase, OperationPhase::SearchingForSource);
}

#[test]
fn test_session_round_trips_through_serialization() {
    let clock = FakeClock::new();
    let mut session = new_session(test_context("Link 1", 300), &clock);
    session.find_source(clock.now()).unwrap();

    // Leave reportable state on the session: it must survive persistence.
    session.start_work_at_source(320, clock.now()).unwrap();
    assert!(session.pending_validation_error.is_some());

    let json = serde_json::to_string(&session).unwrap();
    let restored: WorkSession = serde_json::from_str(&json).unwrap();
    assert_eq!(session, restored);
    assert_eq!(
        restored.pending_validation_error,
        Some(ValidationError::PressureAboveTeamMinimum {
            entered_bar: 320,
            team_min_bar: 300,
        })
    );
}

#[test]
fn test_heavy_work_mode_carried_in_context() {
    let clock = FakeClock::new();
    let mut context = test_context("Link 1", 300);
    context.work_mode = WorkMode::Heavy;
    let session = new_session(context, &clock);

    assert_eq!(session.context.work_mode, WorkMode::Heavy);
    // Victim evacuation from 300 bar is infeasible on this apparatus.
    assert_eq!(session.evacuation_time_with_victim_min, 0);
}
