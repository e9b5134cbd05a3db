//! A single voice memo: playback with a progress timer.

mod action;
mod environment;
mod reducer;
mod state;

pub use action::MemoAction;
pub use environment::MemoEnvironment;
pub use reducer::{player_id, timer_id, VoiceMemoReducer};
pub use state::{Mode, VoiceMemo};
