//! Countdown timers for one session
//!
//! All three timers count whole seconds and are floored at zero. Elapsing
//! N seconds in one step is exactly equivalent to N single-second ticks,
//! including the once-per-crossing expiry signals, so background
//! reconciliation reuses the same code path as the live clock.

use serde::{Deserialize, Serialize};

use airguard_core::AlertKind;

/// Default interval for the periodic radio check-in, seconds (10 minutes).
pub const COMMUNICATION_CHECK_INTERVAL_SECS: u64 = 10 * 60;

/// The three safety countdowns of a work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTimers {
    /// Abandon-search countdown: time left before mandatory egress, seconds
    pub exit_secs: u64,

    /// Air-budget countdown: time left on the remaining charge, seconds
    pub remaining_secs: u64,

    /// Fixed periodic check-in countdown, seconds. Counts down once;
    /// resets are handled by the safety post, not this engine.
    pub communication_secs: u64,
}

impl Default for SessionTimers {
    fn default() -> Self {
        Self::new(COMMUNICATION_CHECK_INTERVAL_SECS)
    }
}

impl SessionTimers {
    pub fn new(communication_secs: u64) -> Self {
        Self {
            exit_secs: 0,
            remaining_secs: 0,
            communication_secs,
        }
    }

    /// Elapse `secs` seconds on every timer, floored at zero.
    ///
    /// Returns one [`AlertKind`] per timer that crossed from `>0` to `0`
    /// during this step — never for timers already at zero.
    pub fn elapse(&mut self, secs: u64) -> Vec<AlertKind> {
        let mut expired = Vec::new();

        for (value, kind) in [
            (&mut self.exit_secs, AlertKind::ExitTimerExpired),
            (&mut self.remaining_secs, AlertKind::RemainingTimerExpired),
            (&mut self.communication_secs, AlertKind::CommunicationDue),
        ] {
            let crossed = *value > 0 && secs >= *value;
            *value = value.saturating_sub(secs);
            if crossed {
                expired.push(kind);
            }
        }

        expired
    }

    /// One second of wall-clock time.
    pub fn tick(&mut self) -> Vec<AlertKind> {
        self.elapse(1)
    }

    /// Currently running timers as `(kind, seconds_left)` pairs.
    pub fn active(&self) -> Vec<(AlertKind, u64)> {
        [
            (AlertKind::ExitTimerExpired, self.exit_secs),
            (AlertKind::RemainingTimerExpired, self.remaining_secs),
            (AlertKind::CommunicationDue, self.communication_secs),
        ]
        .into_iter()
        .filter(|(_, secs)| *secs > 0)
        .collect()
    }
}
