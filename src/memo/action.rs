use crate::env::{AudioPlayerError, PlayerEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum MemoAction {
    /// Playback ended, successfully or not.
    AudioPlayer(Result<PlayerEvent, AudioPlayerError>),
    PlayButtonTapped,
    Delete,
    /// Seconds elapsed since playback started.
    TimerUpdated(f64),
    TitleChanged(String),
}
