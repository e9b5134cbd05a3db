//! Capabilities that effects run against.
//!
//! Each capability is an object-safe trait shared as `Arc<dyn ..>` inside a
//! feature's environment, so hosts and tests can swap implementations.

mod audio;
mod clock;
mod simulated;
mod system;

pub use audio::{
    AudioPlayer, AudioPlayerError, AudioRecorder, AudioRecorderError, PlayerEvent, RecorderEvent,
};
pub use clock::{Clock, SystemClock, TestClock};
pub use simulated::{MemoLibrary, SimulatedPlayer, SimulatedRecorder};
pub use system::{FixedPermission, LoggingSettings, RecordPermission, SettingsOpener};
