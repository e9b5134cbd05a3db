use std::future;

use futures::stream::{self, StreamExt};

use crate::arch::{CasePath, Effect, EffectId, Effects, Lens, Reducer, ReducerExt};
use crate::memo::{player_id, timer_id, MemoAction, Mode, VoiceMemo, VoiceMemoReducer};
use crate::memos::action::MemosAction;
use crate::memos::environment::MemosEnvironment;
use crate::memos::state::{Alert, CurrentRecording, RecorderPermission, RecordingMode, VoiceMemos};

pub const PERMISSION_REQUIRED: &str = "Permission is required to record voice memos.";
pub const RECORDING_FAILED: &str = "Voice memo recording failed.";

pub fn recorder_id() -> EffectId {
    EffectId::new("voice-memos.recorder")
}

pub fn recorder_timer_id() -> EffectId {
    EffectId::new("voice-memos.recorder-timer")
}

/// The full feature: every memo's own reducer, then the list and recorder.
pub fn voice_memos_reducer(
) -> impl Reducer<State = VoiceMemos, Action = MemosAction, Environment = MemosEnvironment> {
    VoiceMemoReducer
        .for_each_keyed(
            Lens::new(|state: &VoiceMemos| &state.voice_memos, |state| &mut state.voice_memos),
            CasePath::new(
                |action| match action {
                    MemosAction::VoiceMemo(url, action) => Some((url, action)),
                    _ => None,
                },
                |(url, action)| MemosAction::VoiceMemo(url, action),
            ),
            MemosEnvironment::memo,
        )
        .combine(ListReducer)
}

/// List and recorder logic. Runs after the addressed memo has reduced its
/// own action.
pub struct ListReducer;

impl Reducer for ListReducer {
    type State = VoiceMemos;
    type Action = MemosAction;
    type Environment = MemosEnvironment;

    fn reduce(
        &self,
        state: &mut VoiceMemos,
        action: MemosAction,
        environment: &MemosEnvironment,
    ) -> Effects<MemosAction, MemosEnvironment> {
        match action {
            MemosAction::AlertDismissed => {
                state.alert = None;
                Vec::new()
            }

            MemosAction::AudioRecorder(Ok(event)) if event.is_success() => finish_recording(state),

            MemosAction::AudioRecorder(outcome) => {
                tracing::warn!(outcome = ?outcome, "recording failed");
                state.alert = Some(Alert::new(RECORDING_FAILED));
                state.current_recording = None;
                vec![Effect::cancel(recorder_timer_id())]
            }

            MemosAction::CurrentRecordingTimerUpdated => {
                if let Some(recording) = &mut state.current_recording {
                    recording.duration += environment.recording_tick.as_secs_f64();
                }
                Vec::new()
            }

            MemosAction::FinalRecordingTime(duration) => {
                if let Some(recording) = &mut state.current_recording {
                    recording.duration = duration;
                }
                Vec::new()
            }

            MemosAction::OpenSettingsButtonTapped => vec![Effect::fire_and_forget(
                |env: MemosEnvironment| env.settings.open(),
            )
            .labeled("open-settings")],

            MemosAction::RecordButtonTapped => match state.permission {
                RecorderPermission::Undetermined => vec![request_permission()],
                RecorderPermission::Denied => {
                    state.alert = Some(Alert::new(PERMISSION_REQUIRED));
                    Vec::new()
                }
                RecorderPermission::Allowed => match &mut state.current_recording {
                    None => start_recording(state, environment),
                    Some(recording) if recording.mode == RecordingMode::Recording => {
                        recording.mode = RecordingMode::Encoding;
                        stop_recording()
                    }
                    Some(_) => Vec::new(),
                },
            },

            MemosAction::RecordPermissionResponse(true) => {
                state.permission = RecorderPermission::Allowed;
                start_recording(state, environment)
            }

            MemosAction::RecordPermissionResponse(false) => {
                state.permission = RecorderPermission::Denied;
                state.alert = Some(Alert::new(PERMISSION_REQUIRED));
                Vec::new()
            }

            MemosAction::VoiceMemo(url, MemoAction::Delete) => {
                state.voice_memos.remove(&url);
                Vec::new()
            }

            MemosAction::VoiceMemo(url, MemoAction::PlayButtonTapped) => {
                let mut effects = Vec::new();
                for memo in state.voice_memos.iter_mut() {
                    if memo.url != url && memo.mode.is_playing() {
                        memo.mode = Mode::NotPlaying;
                        effects.push(Effect::cancel(player_id(&memo.url)));
                        effects.push(Effect::cancel(timer_id(&memo.url)));
                    }
                }
                effects
            }

            MemosAction::VoiceMemo(..) => Vec::new(),
        }
    }
}

fn finish_recording(state: &mut VoiceMemos) -> Effects<MemosAction, MemosEnvironment> {
    match state.current_recording.take() {
        Some(recording) if recording.mode == RecordingMode::Encoding => {
            let url = recording.url.clone();
            if state.voice_memos.insert(0, VoiceMemo::from(recording)).is_some() {
                tracing::error!(url = %url.display(), "a memo for this file already exists; keeping the old one");
            }
        }
        other => {
            tracing::error!(recording = ?other, "recorder finished while not encoding; ignoring");
            state.current_recording = other;
        }
    }
    Vec::new()
}

fn request_permission() -> Effect<MemosAction, MemosEnvironment> {
    Effect::task(|env: MemosEnvironment| {
        let reply = env.permission.request();
        async move { MemosAction::RecordPermissionResponse(reply.await) }
    })
    .labeled("request-permission")
}

fn start_recording(
    state: &mut VoiceMemos,
    environment: &MemosEnvironment,
) -> Effects<MemosAction, MemosEnvironment> {
    let url = environment
        .temporary_directory
        .join(format!("{}.m4a", (environment.uuid)()));
    state.current_recording = Some(CurrentRecording {
        date: (environment.date)(),
        duration: 0.0,
        mode: RecordingMode::Recording,
        url: url.clone(),
    });

    vec![
        Effect::result(
            move |env: MemosEnvironment| env.recorder.start_recording(&url),
            MemosAction::AudioRecorder,
        )
        .cancellable(recorder_id())
        .labeled("start-recording"),
        Effect::stream(|env: MemosEnvironment| {
            env.clock
                .ticks(env.recording_tick)
                .map(|_| MemosAction::CurrentRecordingTimerUpdated)
        })
        .cancellable(recorder_timer_id())
        .labeled("recording-timer"),
    ]
}

/// The final time is queued before the recorder is told to stop, so it is
/// reduced before the recorder's completion.
fn stop_recording() -> Effects<MemosAction, MemosEnvironment> {
    vec![
        Effect::cancel(recorder_timer_id()),
        Effect::concatenate([
            Effect::stream(|env: MemosEnvironment| {
                stream::once(env.recorder.current_time())
                    .filter_map(|time| future::ready(time.map(MemosAction::FinalRecordingTime)))
            })
            .labeled("final-recording-time"),
            Effect::fire_and_forget(|env: MemosEnvironment| env.recorder.stop_recording())
                .labeled("stop-recording"),
        ]),
    ]
}
