// Engine settings, loaded from a JSON file with environment overrides
use crate::error::{EngineError, Result};
use coinlab_shared::models::TimeFrame;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "COINLAB_CONFIG";
pub const SEED_ENV: &str = "COINLAB_SEED";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    /// Fixed seed for every random source; `None` draws from the OS.
    pub seed: Option<u64>,
    pub storage_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub default_timeframe: TimeFrame,
    pub lookback_points: usize,
    pub session_ticks: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            seed: None,
            storage_path: PathBuf::from("coinlab-store.json"),
            catalog_path: None,
            poll_interval_ms: 15_000,
            default_timeframe: TimeFrame::Month1,
            lookback_points: 500,
            session_ticks: 3,
        }
    }
}

impl EngineSettings {
    /// Reads settings from `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str::<EngineSettings>(&raw).map_err(|e| {
                    EngineError::ConfigError(format!("Invalid settings file '{}': {}", path.display(), e))
                })?
            }
            None => EngineSettings::default(),
        };
        settings.validate()?;
        if let Ok(seed) = std::env::var(SEED_ENV) {
            settings.seed = Some(seed.trim().parse().map_err(|_| {
                EngineError::ConfigError(format!("{} must be an unsigned integer, got '{}'", SEED_ENV, seed))
            })?);
        }
        Ok(settings)
    }

    /// Uses the file named by `COINLAB_CONFIG`, if set.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load(path.as_deref())
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(EngineError::ConfigError("poll_interval_ms must be greater than 0".to_string()));
        }
        let min_lookback = self.default_timeframe.profile().points_to_display;
        if self.lookback_points < min_lookback {
            return Err(EngineError::ConfigError(format!(
                "lookback_points ({}) must cover the {} display window ({})",
                self.lookback_points, self.default_timeframe, min_lookback
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_settings(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = EngineSettings::load(None).unwrap();
        assert_eq!(settings.poll_interval_ms, 15_000);
        assert_eq!(settings.lookback_points, 500);
        assert_eq!(settings.default_timeframe, TimeFrame::Month1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_settings(r#"{ "poll_interval_ms": 2000, "default_timeframe": "1Y" }"#);
        let settings = EngineSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.poll_interval_ms, 2000);
        assert_eq!(settings.default_timeframe, TimeFrame::Year1);
        assert_eq!(settings.session_ticks, 3);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let file = write_settings("{ poll_interval_ms: }");
        let err = EngineSettings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let file = write_settings(r#"{ "poll_interval_ms": 0 }"#);
        assert!(EngineSettings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_lookback_must_cover_display_window() {
        let file = write_settings(r#"{ "lookback_points": 40, "default_timeframe": "3M" }"#);
        let err = EngineSettings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("display window"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineSettings::load(Some(Path::new("definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, EngineError::IoError { .. }));
    }
}
