//! Configuration of the demo binary.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    Config, LoggingConfig, PermissionMode, PlaybackConfig, RecordingConfig, SimulationConfig,
};
