//! Startup configuration
//!
//! Read once from `doodlai.json` (or `$DOODLAI_SETTINGS`). The classifier
//! address is fixed for the life of the process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_API_BASE, DEFAULT_BRUSH_WIDTH, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_ROUND_TIME_SECS,
    DEFAULT_TOTAL_ROUNDS, MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH,
};

/// Game/client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Classifier service base address
    pub api_base_url: String,
    /// Per-request timeout for health/predict calls
    pub request_timeout_secs: u64,
    /// Rounds per game
    pub total_rounds: u32,
    /// Seconds on the clock for a whole game
    pub round_time_secs: u32,
    /// Initial brush width
    pub brush_width: u32,
    /// Fixed RNG seed for reproducible targets
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            round_time_secs: DEFAULT_ROUND_TIME_SECS,
            brush_width: DEFAULT_BRUSH_WIDTH,
            seed: None,
        }
    }
}

impl Settings {
    /// Default settings file name
    const FILE_NAME: &'static str = "doodlai.json";
    /// Environment override for the settings path
    const PATH_ENV: &'static str = "DOODLAI_SETTINGS";

    /// Where `load()` looks
    pub fn default_path() -> PathBuf {
        std::env::var_os(Self::PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME))
    }

    /// Load from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::info!("Invalid settings in {} ({e}), using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp out-of-range values
    pub fn sanitized(mut self) -> Self {
        self.total_rounds = self.total_rounds.max(1);
        self.round_time_secs = self.round_time_secs.max(1);
        self.brush_width = self.brush_width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = DEFAULT_API_BASE.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://localhost:8000");
        assert_eq!(settings.total_rounds, 5);
        assert_eq!(settings.round_time_secs, 60);
        assert_eq!(settings.brush_width, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doodlai.json");
        std::fs::write(&path, r#"{"total_rounds": 3, "brush_width": 99}"#).unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.total_rounds, 3);
        assert_eq!(settings.brush_width, 30);
        assert_eq!(settings.round_time_secs, 60);
    }

    #[test]
    fn test_missing_or_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load_from(&dir.path().join("absent.json")), Settings::default());
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doodlai.json");
        let settings = Settings {
            seed: Some(7),
            total_rounds: 2,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }
}
