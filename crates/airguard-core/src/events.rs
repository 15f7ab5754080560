//! Alert and timer event definitions

use serde::{Deserialize, Serialize};

/// The safety timers a session counts down.
///
/// Doubles as the identity of a scheduled alert: one alert of each kind may
/// be pending per session, and cancelling a session drops all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// The abandon-search countdown ran out; the team must begin egress
    ExitTimerExpired,

    /// The air-budget countdown ran out; egress must already be underway
    RemainingTimerExpired,

    /// Periodic radio check-in with the safety post is due
    CommunicationDue,
}

impl AlertKind {
    pub const ALL: &'static [AlertKind] = &[
        AlertKind::ExitTimerExpired,
        AlertKind::RemainingTimerExpired,
        AlertKind::CommunicationDue,
    ];

    /// Short human-readable label for logs and alert payloads.
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::ExitTimerExpired => "exit timer expired",
            AlertKind::RemainingTimerExpired => "remaining work time expired",
            AlertKind::CommunicationDue => "communication check-in due",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_kind_round_trip() {
        for kind in AlertKind::ALL {
            let json = serde_json::to_string(kind).unwrap();
            let back: AlertKind = serde_json::from_str(&json).unwrap();
            assert_eq!(*kind, back);
        }
    }
}
