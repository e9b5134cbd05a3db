//! Shared test utilities and spy capabilities.

#![allow(dead_code, unused_imports)]

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tokio::sync::oneshot;
use uuid::Uuid;
use voice_memos::arch::{Action, State, Store};
use voice_memos::env::{
    AudioPlayer, AudioPlayerError, AudioRecorder, AudioRecorderError, PlayerEvent,
    RecordPermission, RecorderEvent, SettingsOpener, TestClock,
};
use voice_memos::memos::MemosEnvironment;

/// Create a temporary config file with the given TOML content.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Wait until the store's state satisfies `ready`.
pub async fn wait_until<S: State, A: Action>(store: &Store<S, A>, ready: impl Fn(&S) -> bool) -> S {
    let mut states = store.observe();
    let state = tokio::time::timeout(Duration::from_secs(5), states.wait_for(|s| ready(s)))
        .await
        .expect("timed out waiting for state")
        .expect("store closed");
    state.clone()
}

/// Give spawned loop and effect tasks a chance to run.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

// -- Spy capabilities ---------------------------------------------------------

type PlayReply = oneshot::Sender<Result<PlayerEvent, AudioPlayerError>>;

/// Player whose playbacks only end when the test finishes them.
#[derive(Default)]
pub struct SpyPlayer {
    pub plays: Mutex<Vec<PathBuf>>,
    pub stops: AtomicUsize,
    pending: Mutex<Vec<(PathBuf, PlayReply)>>,
}

impl SpyPlayer {
    /// Resolve the playback of `url`. Returns false if it was not pending.
    pub fn finish(&self, url: &Path, outcome: Result<PlayerEvent, AudioPlayerError>) -> bool {
        let mut pending = self.pending.lock();
        let Some(index) = pending.iter().position(|(pending, _)| pending == url) else {
            return false;
        };
        let (_, reply) = pending.remove(index);
        reply.send(outcome).is_ok()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl AudioPlayer for SpyPlayer {
    fn play(&self, url: &Path) -> BoxFuture<'static, Result<PlayerEvent, AudioPlayerError>> {
        self.plays.lock().push(url.to_path_buf());
        let (reply, outcome) = oneshot::channel();
        self.pending.lock().push((url.to_path_buf(), reply));
        async move {
            match outcome.await {
                Ok(outcome) => outcome,
                Err(_) => future::pending().await,
            }
        }
        .boxed()
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

type RecordReply = oneshot::Sender<Result<RecorderEvent, AudioRecorderError>>;

/// Recorder that finishes with `stop_outcome` when stopped.
pub struct SpyRecorder {
    pub started: Mutex<Vec<PathBuf>>,
    pub stops: AtomicUsize,
    pub current_time: Mutex<Option<f64>>,
    pub stop_outcome: Mutex<Result<RecorderEvent, AudioRecorderError>>,
    pending: Mutex<Option<RecordReply>>,
}

impl Default for SpyRecorder {
    fn default() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            current_time: Mutex::new(None),
            stop_outcome: Mutex::new(Ok(RecorderEvent::DidFinishRecording { successfully: true })),
            pending: Mutex::new(None),
        }
    }
}

impl SpyRecorder {
    /// Fail the running recording right away.
    pub fn fail(&self, error: AudioRecorderError) -> bool {
        match self.pending.lock().take() {
            Some(reply) => reply.send(Err(error)).is_ok(),
            None => false,
        }
    }
}

impl AudioRecorder for SpyRecorder {
    fn start_recording(
        &self,
        url: &Path,
    ) -> BoxFuture<'static, Result<RecorderEvent, AudioRecorderError>> {
        self.started.lock().push(url.to_path_buf());
        let (reply, outcome) = oneshot::channel();
        *self.pending.lock() = Some(reply);
        async move {
            match outcome.await {
                Ok(outcome) => outcome,
                Err(_) => future::pending().await,
            }
        }
        .boxed()
    }

    fn current_time(&self) -> BoxFuture<'static, Option<f64>> {
        future::ready(*self.current_time.lock()).boxed()
    }

    fn stop_recording(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.pending.lock().take() {
            let _ = reply.send(self.stop_outcome.lock().clone());
        }
    }
}

/// Permission prompt with a fixed answer that counts requests.
pub struct SpyPermission {
    pub granted: bool,
    pub requests: AtomicUsize,
}

impl RecordPermission for SpyPermission {
    fn request(&self) -> BoxFuture<'static, bool> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        future::ready(self.granted).boxed()
    }
}

#[derive(Default)]
pub struct SpySettings {
    pub opened: AtomicUsize,
}

impl SettingsOpener for SpySettings {
    fn open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }
}

// -- Environment --------------------------------------------------------------

/// Spies plus the environment wired to them.
pub struct Harness {
    pub clock: TestClock,
    pub player: Arc<SpyPlayer>,
    pub recorder: Arc<SpyRecorder>,
    pub permission: Arc<SpyPermission>,
    pub settings: Arc<SpySettings>,
    pub environment: MemosEnvironment,
}

/// Recording file names are `00000000-0000-0000-0000-00000000000N.m4a`,
/// counting from 1; recording dates are `UNIX_EPOCH + N` seconds.
pub fn harness(granted: bool) -> Harness {
    let clock = TestClock::new();
    let player = Arc::new(SpyPlayer::default());
    let recorder = Arc::new(SpyRecorder::default());
    let permission = Arc::new(SpyPermission {
        granted,
        requests: AtomicUsize::new(0),
    });
    let settings = Arc::new(SpySettings::default());

    let ids = Arc::new(AtomicU64::new(0));
    let dates = Arc::clone(&ids);
    let environment = MemosEnvironment {
        recorder: recorder.clone(),
        player: player.clone(),
        clock: Arc::new(clock.clone()),
        permission: permission.clone(),
        settings: settings.clone(),
        date: Arc::new(move || {
            SystemTime::UNIX_EPOCH + Duration::from_secs(dates.load(Ordering::SeqCst))
        }),
        uuid: Arc::new(move || Uuid::from_u128(u128::from(ids.fetch_add(1, Ordering::SeqCst) + 1))),
        temporary_directory: PathBuf::from("/tmp/voice-memos-test"),
        recording_tick: Duration::from_secs(1),
        playback_tick: Duration::from_millis(500),
    };

    Harness {
        clock,
        player,
        recorder,
        permission,
        settings,
        environment,
    }
}

/// Path of the N-th recording made through a [`harness`] environment.
pub fn recording_url(n: u128) -> PathBuf {
    PathBuf::from("/tmp/voice-memos-test").join(format!("{}.m4a", Uuid::from_u128(n)))
}
