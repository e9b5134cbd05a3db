use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/voice-memos/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("voice-memos").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - Otherwise behaves like [`load_from`](Self::load_from).
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(&path)
    }

    /// Loads, parses and validates the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The log level is a valid filter directive
    /// - Timer intervals are non-zero
    /// - Recording length and playback speed are positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid log level '{}': {}", self.logging.level, err),
            });
        }

        if self.recording.timer_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "recording.timer_interval_ms must be greater than zero".to_string(),
            });
        }

        if self.playback.timer_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "playback.timer_interval_ms must be greater than zero".to_string(),
            });
        }

        let seconds = self.simulation.recording_seconds;
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "simulation.recording_seconds must be positive, got {}",
                    seconds
                ),
            });
        }

        let speed = self.simulation.playback_speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::ValidationError {
                message: format!("simulation.playback_speed must be positive, got {}", speed),
            });
        }

        Ok(())
    }
}
