use std::path::PathBuf;

use crate::env::{AudioRecorderError, RecorderEvent};
use crate::memo::MemoAction;

#[derive(Debug, Clone, PartialEq)]
pub enum MemosAction {
    AlertDismissed,
    /// The recorder finished, successfully or not.
    AudioRecorder(Result<RecorderEvent, AudioRecorderError>),
    CurrentRecordingTimerUpdated,
    /// Seconds recorded, read when stop was requested.
    FinalRecordingTime(f64),
    OpenSettingsButtonTapped,
    RecordButtonTapped,
    RecordPermissionResponse(bool),
    /// An action for the memo recorded at the given file.
    VoiceMemo(PathBuf, MemoAction),
}
