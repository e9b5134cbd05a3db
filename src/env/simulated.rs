//! In-process stand-ins for the audio hardware.
//!
//! The recorder measures how long each session ran and files the length in
//! a shared [`MemoLibrary`]; the player "plays" a file by waiting for its
//! recorded length divided by the playback speed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::audio::{
    AudioPlayer, AudioPlayerError, AudioRecorder, AudioRecorderError, PlayerEvent, RecorderEvent,
};
use super::clock::Clock;

/// Recorded lengths in seconds, keyed by file.
#[derive(Clone, Default)]
pub struct MemoLibrary {
    recordings: Arc<Mutex<HashMap<PathBuf, f64>>>,
}

impl MemoLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<PathBuf>, seconds: f64) {
        self.recordings.lock().insert(url.into(), seconds);
    }

    pub fn duration(&self, url: &Path) -> Option<f64> {
        self.recordings.lock().get(url).copied()
    }
}

pub struct SimulatedRecorder {
    library: MemoLibrary,
    clock: Arc<dyn Clock>,
    session: Mutex<Option<Session>>,
}

struct Session {
    url: PathBuf,
    started: Duration,
    finished: Arc<Notify>,
}

impl SimulatedRecorder {
    pub fn new(library: MemoLibrary, clock: Arc<dyn Clock>) -> Self {
        Self {
            library,
            clock,
            session: Mutex::new(None),
        }
    }
}

impl AudioRecorder for SimulatedRecorder {
    fn start_recording(
        &self,
        url: &Path,
    ) -> BoxFuture<'static, Result<RecorderEvent, AudioRecorderError>> {
        let mut session = self.session.lock();
        if let Some(active) = session.as_ref() {
            return future::ready(Err(AudioRecorderError::CouldNotStart {
                path: url.display().to_string(),
                message: format!("already recording to '{}'", active.url.display()),
            }))
            .boxed();
        }

        let finished = Arc::new(Notify::new());
        *session = Some(Session {
            url: url.to_path_buf(),
            started: self.clock.now(),
            finished: Arc::clone(&finished),
        });
        tracing::info!(url = %url.display(), "recording started");

        async move {
            finished.notified().await;
            Ok(RecorderEvent::DidFinishRecording { successfully: true })
        }
        .boxed()
    }

    fn current_time(&self) -> BoxFuture<'static, Option<f64>> {
        let elapsed = self
            .session
            .lock()
            .as_ref()
            .map(|session| self.clock.now().saturating_sub(session.started).as_secs_f64());
        future::ready(elapsed).boxed()
    }

    fn stop_recording(&self) {
        let Some(session) = self.session.lock().take() else {
            tracing::debug!("stop requested with no recording in progress");
            return;
        };
        let seconds = self.clock.now().saturating_sub(session.started).as_secs_f64();
        tracing::info!(url = %session.url.display(), seconds, "recording stopped");
        self.library.insert(session.url, seconds);
        // Stored as a permit if the recording future is not waiting yet.
        session.finished.notify_one();
    }
}

pub struct SimulatedPlayer {
    library: MemoLibrary,
    speed: f64,
    stopped: Arc<Notify>,
}

impl SimulatedPlayer {
    /// `speed` scales playback; 2.0 plays a memo in half its length.
    pub fn new(library: MemoLibrary, speed: f64) -> Self {
        Self {
            library,
            speed,
            stopped: Arc::new(Notify::new()),
        }
    }
}

impl AudioPlayer for SimulatedPlayer {
    fn play(&self, url: &Path) -> BoxFuture<'static, Result<PlayerEvent, AudioPlayerError>> {
        let Some(seconds) = self.library.duration(url) else {
            return future::ready(Err(AudioPlayerError::Decode {
                path: url.display().to_string(),
            }))
            .boxed();
        };

        let length = Duration::try_from_secs_f64(seconds / self.speed).unwrap_or_default();
        self.stopped.notify_waiters();
        let stopped = Arc::clone(&self.stopped);
        tracing::info!(url = %url.display(), ?length, "playback started");

        async move {
            tokio::select! {
                _ = tokio::time::sleep(length) => {
                    Ok(PlayerEvent::DidFinishPlaying { successfully: true })
                }
                _ = stopped.notified() => {
                    Ok(PlayerEvent::DidFinishPlaying { successfully: false })
                }
            }
        }
        .boxed()
    }

    fn stop(&self) {
        tracing::info!("playback stopped");
        self.stopped.notify_waiters();
    }
}
