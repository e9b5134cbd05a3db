use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use uuid::Uuid;

use crate::config::Config;
use crate::env::{
    AudioPlayer, AudioRecorder, Clock, FixedPermission, LoggingSettings, MemoLibrary,
    RecordPermission, SettingsOpener, SimulatedPlayer, SimulatedRecorder, SystemClock,
};
use crate::memo::MemoEnvironment;

/// Capabilities of the voice memo list and recorder.
#[derive(Clone)]
pub struct MemosEnvironment {
    pub recorder: Arc<dyn AudioRecorder>,
    pub player: Arc<dyn AudioPlayer>,
    pub clock: Arc<dyn Clock>,
    pub permission: Arc<dyn RecordPermission>,
    pub settings: Arc<dyn SettingsOpener>,
    /// Wall-clock date stamped on new recordings.
    pub date: Arc<dyn Fn() -> SystemTime + Send + Sync>,
    /// Names new recording files.
    pub uuid: Arc<dyn Fn() -> Uuid + Send + Sync>,
    pub temporary_directory: PathBuf,
    /// Interval of the recording duration timer.
    pub recording_tick: Duration,
    /// Interval of the playback progress timer.
    pub playback_tick: Duration,
}

impl MemosEnvironment {
    /// Environment for the demo: simulated audio on the system clock.
    pub fn simulated(config: &Config) -> Self {
        let library = MemoLibrary::new();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let granted = config.simulation.permission.is_granted();

        Self {
            recorder: Arc::new(SimulatedRecorder::new(library.clone(), Arc::clone(&clock))),
            player: Arc::new(SimulatedPlayer::new(library, config.simulation.playback_speed)),
            clock,
            permission: Arc::new(FixedPermission::new(granted)),
            settings: Arc::new(LoggingSettings),
            date: Arc::new(SystemTime::now),
            uuid: Arc::new(Uuid::new_v4),
            temporary_directory: config.recording.temporary_directory(),
            recording_tick: Duration::from_millis(config.recording.timer_interval_ms),
            playback_tick: Duration::from_millis(config.playback.timer_interval_ms),
        }
    }

    /// The part of the environment a single memo runs against.
    pub fn memo(&self) -> MemoEnvironment {
        MemoEnvironment {
            player: Arc::clone(&self.player),
            clock: Arc::clone(&self.clock),
            tick: self.playback_tick,
        }
    }
}
