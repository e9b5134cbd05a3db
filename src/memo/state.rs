use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

use crate::arch::Identifiable;

/// One recorded memo, identified by the file it was recorded to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceMemo {
    pub date: SystemTime,
    /// Length in seconds.
    pub duration: f64,
    pub mode: Mode,
    pub title: String,
    pub url: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    NotPlaying,
    Playing {
        /// Fraction of the memo played, in `0.0..=1.0`.
        progress: f64,
    },
}

impl Mode {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }
}

impl VoiceMemo {
    pub fn new(url: impl Into<PathBuf>, date: SystemTime, duration: f64) -> Self {
        Self {
            date,
            duration,
            mode: Mode::NotPlaying,
            title: String::new(),
            url: url.into(),
        }
    }
}

impl Identifiable for VoiceMemo {
    type Id = PathBuf;

    fn id(&self) -> PathBuf {
        self.url.clone()
    }
}
