//! The voice memo list and recorder, composed from the single-memo feature.

mod action;
mod environment;
mod reducer;
mod state;

pub use action::MemosAction;
pub use environment::MemosEnvironment;
pub use reducer::{
    recorder_id, recorder_timer_id, voice_memos_reducer, ListReducer, PERMISSION_REQUIRED,
    RECORDING_FAILED,
};
pub use state::{Alert, CurrentRecording, RecorderPermission, RecordingMode, VoiceMemos};
