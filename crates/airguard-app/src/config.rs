//! Settings parser for .airguard/config.toml

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use airguard_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const AIRGUARD_DIR: &str = ".airguard";

/// Runtime settings, all optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Initial radio check-in countdown for new sessions, seconds
    pub communication_interval_secs: u64,

    /// Where the active session set is persisted.
    /// Defaults to `<data_local_dir>/airguard/`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            communication_interval_secs: crate::session::timers::COMMUNICATION_CHECK_INTERVAL_SECS,
            data_dir: None,
        }
    }
}

impl Settings {
    /// Path of the config file under `base_dir`.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(AIRGUARD_DIR).join(CONFIG_FILENAME)
    }

    /// Load settings from `base_dir/.airguard/config.toml`.
    ///
    /// A missing file yields defaults; a malformed file is an error rather
    /// than silently running with wrong safety intervals.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = Self::config_path(base_dir);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| Error::config_invalid(format!("{}: {e}", path.display())))?;

        if settings.communication_interval_secs == 0 {
            return Err(Error::config_invalid(format!(
                "{}: communication_interval_secs must be positive",
                path.display()
            )));
        }

        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Effective data directory for session persistence.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("airguard")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.communication_interval_secs, 600);
    }

    #[test]
    fn test_load_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(AIRGUARD_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join(CONFIG_FILENAME),
            "communication_interval_secs = 300\ndata_dir = \"/var/lib/airguard\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.communication_interval_secs, 300);
        assert_eq!(settings.data_dir(), PathBuf::from("/var/lib/airguard"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(AIRGUARD_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILENAME), "communication_interval_secs = \"soon\"").unwrap();

        assert!(matches!(
            Settings::load(dir.path()),
            Err(Error::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(AIRGUARD_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILENAME), "communication_interval_secs = 0").unwrap();

        assert!(matches!(
            Settings::load(dir.path()),
            Err(Error::ConfigInvalid { .. })
        ));
    }
}
