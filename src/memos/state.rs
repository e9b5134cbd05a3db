use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

use crate::arch::IdentifiedVec;
use crate::memo::VoiceMemo;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VoiceMemos {
    pub alert: Option<Alert>,
    pub permission: RecorderPermission,
    pub current_recording: Option<CurrentRecording>,
    pub voice_memos: IdentifiedVec<VoiceMemo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
}

impl Alert {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderPermission {
    Allowed,
    Denied,
    #[default]
    Undetermined,
}

/// A recording that has not yet become a memo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentRecording {
    pub date: SystemTime,
    /// Seconds recorded so far.
    pub duration: f64,
    pub mode: RecordingMode,
    pub url: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingMode {
    Recording,
    /// Stop was requested; waiting for the recorder to finalize the file.
    Encoding,
}

impl From<CurrentRecording> for VoiceMemo {
    fn from(recording: CurrentRecording) -> Self {
        VoiceMemo::new(recording.url, recording.date, recording.duration)
    }
}
