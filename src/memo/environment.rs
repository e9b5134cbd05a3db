use std::sync::Arc;
use std::time::Duration;

use crate::env::{AudioPlayer, Clock};

/// What a single memo needs to play itself.
#[derive(Clone)]
pub struct MemoEnvironment {
    pub player: Arc<dyn AudioPlayer>,
    pub clock: Arc<dyn Clock>,
    /// Interval between progress updates while playing.
    pub tick: Duration,
}
