//! Clock abstraction for deterministic time in tests

use chrono::{DateTime, Local};

/// Source of wall-clock time for the registry and sessions.
///
/// Injected at construction so tests can drive transitions against a fixed
/// or scripted clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
