//! Audio playback and recording capabilities.

use std::path::Path;

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;

/// Terminal event of a playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerEvent {
    DidFinishPlaying { successfully: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioPlayerError {
    #[error("Failed to decode audio at '{path}'")]
    Decode { path: String },

    #[error("Audio player unavailable: {message}")]
    Unavailable { message: String },
}

/// Plays one file at a time.
pub trait AudioPlayer: Send + Sync {
    /// Start playing `url`. The future resolves when playback ends or fails.
    ///
    /// Starting a new playback replaces the current one, which then resolves
    /// as stopped.
    fn play(&self, url: &Path) -> BoxFuture<'static, Result<PlayerEvent, AudioPlayerError>>;

    /// Stop the current playback, if any.
    fn stop(&self);
}

/// Terminal event of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecorderEvent {
    DidFinishRecording { successfully: bool },
}

impl RecorderEvent {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::DidFinishRecording { successfully: true })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioRecorderError {
    #[error("Could not start recording to '{path}': {message}")]
    CouldNotStart { path: String, message: String },

    #[error("Failed to encode recording")]
    Encode,
}

/// Records one file at a time.
pub trait AudioRecorder: Send + Sync {
    /// Start recording into `url`. The future resolves when the recording
    /// has been stopped and finalized, or fails.
    fn start_recording(
        &self,
        url: &Path,
    ) -> BoxFuture<'static, Result<RecorderEvent, AudioRecorderError>>;

    /// Seconds recorded so far, read when this is called. `None` when idle.
    fn current_time(&self) -> BoxFuture<'static, Option<f64>>;

    /// Stop the current recording, if any.
    fn stop_recording(&self);
}
