//! Scripted session: record a memo, stop, then play it back.
//!
//! The script drives the store only through `dispatch` and observes it only
//! through `observe`/`subscribe`, the way a UI would.

use std::time::Duration;

use thiserror::Error;

use crate::arch::{Action, State, Store, StoreError, Subscription};
use crate::config::Config;
use crate::memo::{MemoAction, Mode, VoiceMemo};
use crate::memos::{voice_memos_reducer, MemosAction, MemosEnvironment, RecordingMode, VoiceMemos};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The session stopped at an alert (e.g. permission denied).
    Alert(String),
    /// A memo was recorded and played to the end.
    Played(VoiceMemo),
}

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: &'static str, after: Duration },

    #[error("Recorded memo disappeared before playback")]
    MemoMissing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run the scripted session with the simulated environment from `config`.
pub async fn run(config: &Config, format: OutputFormat) -> Result<Outcome, DemoError> {
    let environment = MemosEnvironment::simulated(config);
    let store = Store::new(VoiceMemos::default(), voice_memos_reducer(), environment);
    let _printer = print_changes(&store, format);
    print_state(&store.state(), format);

    tracing::info!("tapping record");
    store.try_dispatch(MemosAction::RecordButtonTapped)?;
    let state = wait_for(&store, "recording to start", STEP_TIMEOUT, |state| {
        state.current_recording.is_some() || state.alert.is_some()
    })
    .await?;
    if let Some(alert) = state.alert {
        return Ok(Outcome::Alert(alert.title));
    }

    let length = Duration::try_from_secs_f64(config.simulation.recording_seconds).unwrap_or_default();
    tokio::time::sleep(length).await;

    tracing::info!("tapping record again to stop");
    store.try_dispatch(MemosAction::RecordButtonTapped)?;
    let state = wait_for(&store, "the recording to be saved", STEP_TIMEOUT, |state| {
        !state.voice_memos.is_empty() || state.alert.is_some()
    })
    .await?;
    if let Some(alert) = state.alert {
        return Ok(Outcome::Alert(alert.title));
    }
    let Some(recorded) = state.voice_memos.first().cloned() else {
        return Err(DemoError::MemoMissing);
    };

    play(&store, recorded, config).await
}

async fn play(
    store: &Store<VoiceMemos, MemosAction>,
    recorded: VoiceMemo,
    config: &Config,
) -> Result<Outcome, DemoError> {
    let key = recorded.url.clone();
    let embed_key = key.clone();
    let memo: Store<Option<VoiceMemo>, MemoAction> = store.scope(
        move |state: &VoiceMemos| state.voice_memos.get(&key).cloned(),
        move |action| MemosAction::VoiceMemo(embed_key.clone(), action),
    );

    memo.try_dispatch(MemoAction::TitleChanged("Demo memo".to_string()))?;
    memo.try_dispatch(MemoAction::PlayButtonTapped)?;
    wait_for(&memo, "playback to start", STEP_TIMEOUT, |memo| {
        memo.as_ref().is_some_and(|memo| memo.mode.is_playing())
    })
    .await?;

    let playback = recorded.duration / config.simulation.playback_speed;
    let limit = STEP_TIMEOUT + Duration::try_from_secs_f64(playback).unwrap_or_default();
    let finished = wait_for(&memo, "playback to finish", limit, |memo| {
        memo.as_ref().is_some_and(|memo| !memo.mode.is_playing())
    })
    .await?;

    finished.map(Outcome::Played).ok_or(DemoError::MemoMissing)
}

async fn wait_for<S, A>(
    store: &Store<S, A>,
    what: &'static str,
    limit: Duration,
    ready: impl Fn(&S) -> bool,
) -> Result<S, DemoError>
where
    S: State,
    A: Action,
{
    let mut states = store.observe();
    let outcome = match tokio::time::timeout(limit, states.wait_for(|state| ready(state))).await {
        Ok(Ok(state)) => Ok(state.clone()),
        Ok(Err(_)) => Err(DemoError::Store(StoreError::Closed)),
        Err(_) => Err(DemoError::Timeout { what, after: limit }),
    };
    outcome
}

fn print_changes(store: &Store<VoiceMemos, MemosAction>, format: OutputFormat) -> Subscription {
    store.subscribe(move |state| print_state(state, format))
}

fn print_state(state: &VoiceMemos, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", describe(state)),
        OutputFormat::Json => match serde_json::to_string(state) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::warn!(error = %err, "failed to serialize state"),
        },
    }
}

/// One-line summary of the session state.
pub fn describe(state: &VoiceMemos) -> String {
    let mut parts = vec![format!("permission={:?}", state.permission)];

    if let Some(recording) = &state.current_recording {
        let mode = match recording.mode {
            RecordingMode::Recording => "recording",
            RecordingMode::Encoding => "encoding",
        };
        parts.push(format!("{mode} {:.1}s", recording.duration));
    }

    for memo in &state.voice_memos {
        let title = if memo.title.is_empty() {
            "untitled"
        } else {
            memo.title.as_str()
        };
        let status = match memo.mode {
            Mode::NotPlaying => "stopped".to_string(),
            Mode::Playing { progress } => format!("playing {:.0}%", progress * 100.0),
        };
        parts.push(format!("memo \"{title}\" {:.1}s {status}", memo.duration));
    }

    if let Some(alert) = &state.alert {
        parts.push(format!("alert: {}", alert.title));
    }

    parts.join(" | ")
}
