use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info",
    /// "voice_memos=debug").
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Directory new recordings are written to (default: the system temp dir).
    #[serde(default)]
    pub temporary_directory: Option<PathBuf>,
    /// Recording duration timer interval in milliseconds (default: 1000).
    #[serde(default = "default_recording_interval")]
    pub timer_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Playback progress timer interval in milliseconds (default: 500).
    #[serde(default = "default_playback_interval")]
    pub timer_interval_ms: u64,
}

/// Behaviour of the simulated audio stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub permission: PermissionMode,
    /// How long the scripted session records, in seconds (default: 3).
    #[serde(default = "default_recording_seconds")]
    pub recording_seconds: f64,
    /// Playback speed multiplier (default: 1.0).
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f64,
}

/// Answer of the simulated microphone permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    #[default]
    Grant,
    Deny,
}

impl PermissionMode {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Grant)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_recording_interval() -> u64 {
    1000
}

fn default_playback_interval() -> u64 {
    500
}

fn default_recording_seconds() -> f64 {
    3.0
}

fn default_playback_speed() -> f64 {
    1.0
}

impl RecordingConfig {
    pub fn temporary_directory(&self) -> PathBuf {
        self.temporary_directory
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            temporary_directory: None,
            timer_interval_ms: default_recording_interval(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            timer_interval_ms: default_playback_interval(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            permission: PermissionMode::default(),
            recording_seconds: default_recording_seconds(),
            playback_speed: default_playback_speed(),
        }
    }
}
