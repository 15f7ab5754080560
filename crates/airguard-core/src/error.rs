//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Device Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid device profile: {message}")]
    InvalidDeviceProfile { message: String },

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Maximum of {limit} concurrent sessions reached")]
    SessionLimit { limit: usize },

    #[error("Team '{team_name}' already has an active session")]
    DuplicateTeam { team_name: String },

    #[error("No active session with id {id}")]
    SessionNotFound { id: u64 },

    #[error("No active team member has a usable pressure reading")]
    NoPressureReadings,

    #[error("Cannot {action} while in phase {phase}")]
    InvalidTransition { phase: String, action: &'static str },

    #[error("Work address must not be empty")]
    EmptyWorkAddress,

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    // ─────────────────────────────────────────────────────────────
    // Persistence Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn invalid_device_profile(message: impl Into<String>) -> Self {
        Self::InvalidDeviceProfile {
            message: message.into(),
        }
    }

    pub fn duplicate_team(team_name: impl Into<String>) -> Self {
        Self::DuplicateTeam {
            team_name: team_name.into(),
        }
    }

    pub fn invalid_transition(phase: impl Into<String>, action: &'static str) -> Self {
        Self::InvalidTransition {
            phase: phase.into(),
            action,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors are user-correctable or transient; the session
    /// they touch stays in its prior phase and the operator may retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DuplicateTeam { .. }
                | Error::SessionNotFound { .. }
                | Error::SessionLimit { .. }
                | Error::EmptyWorkAddress
                | Error::Persistence { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidDeviceProfile { .. } | Error::ConfigInvalid { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::duplicate_team("Link 1");
        assert_eq!(
            err.to_string(),
            "Team 'Link 1' already has an active session"
        );

        let err = Error::SessionNotFound { id: 7 };
        assert!(err.to_string().contains("id 7"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::invalid_device_profile("zero cylinder volume").is_fatal());
        assert!(Error::config_invalid("bad toml").is_fatal());
        assert!(!Error::duplicate_team("Link 1").is_fatal());
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::duplicate_team("Link 1").is_recoverable());
        assert!(Error::EmptyWorkAddress.is_recoverable());
        assert!(Error::persistence("disk full").is_recoverable());
        assert!(!Error::invalid_device_profile("bad").is_recoverable());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = Error::invalid_transition("Journaled", "start egress");
        assert_eq!(
            err.to_string(),
            "Cannot start egress while in phase Journaled"
        );
    }
}
