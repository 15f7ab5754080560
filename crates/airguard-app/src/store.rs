//! Persistence of the active session set
//!
//! The format is opaque to the engine; the only contract is a lossless
//! round-trip of [`WorkSession`]. The registry persists after every
//! mutation and treats failures as log-and-continue — a failed write never
//! rolls back a transition.

use std::fs;
use std::path::{Path, PathBuf};

use airguard_core::prelude::*;

use crate::session::WorkSession;

const SESSIONS_FILENAME: &str = "active_sessions.json";

/// Storage collaborator for the active session set.
pub trait SessionStore: Send + Sync {
    /// Replace the stored set with `sessions`.
    fn save(&self, sessions: &[WorkSession]) -> Result<()>;

    /// Load the stored set. An absent store yields an empty set.
    fn load(&self) -> Result<Vec<WorkSession>>;
}

/// JSON file store under the platform data directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write can never leave a torn session set behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store under an explicit data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(SESSIONS_FILENAME),
        }
    }

    /// Store under `<data_local_dir>/airguard/`.
    pub fn default_location() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("airguard"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn save(&self, sessions: &[WorkSession]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_vec_pretty(sessions)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(count = sessions.len(), path = %self.path.display(), "session set persisted");
        Ok(())
    }

    fn load(&self) -> Result<Vec<WorkSession>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&json)?)
    }
}
