//! Clocks and repeating timers.

use std::sync::Arc;
use std::time::Duration;

use futures::channel::mpsc;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};

/// Source of elapsed time and repeating ticks.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Yields the clock reading every `every`, starting one period from now.
    /// The stream ends when dropped.
    fn ticks(&self, every: Duration) -> BoxStream<'static, Duration>;
}

/// Wall clock backed by the Tokio timer.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn ticks(&self, every: Duration) -> BoxStream<'static, Duration> {
        let origin = self.origin;
        let every = every.max(MIN_TICK);
        let mut interval = tokio::time::interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        stream::unfold(interval, move |mut interval| async move {
            let at = interval.tick().await;
            Some((at.duration_since(origin), interval))
        })
        .boxed()
    }
}

const MIN_TICK: Duration = Duration::from_millis(1);

/// Manually driven clock for tests.
///
/// Time only moves on [`advance`](Self::advance); every tick that falls
/// inside the advanced window is delivered in chronological order.
#[derive(Clone, Default)]
pub struct TestClock {
    inner: Arc<Mutex<TestClockState>>,
}

#[derive(Default)]
struct TestClockState {
    now: Duration,
    timers: Vec<TestTimer>,
}

struct TestTimer {
    every: Duration,
    next: Duration,
    ticks: mpsc::UnboundedSender<Duration>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`, firing due timers.
    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock();
        let target = state.now + by;
        state.timers.retain(|timer| !timer.ticks.is_closed());

        loop {
            let due = state
                .timers
                .iter_mut()
                .filter(|timer| timer.next <= target)
                .min_by_key(|timer| timer.next);
            let Some(timer) = due else { break };

            let at = timer.next;
            timer.next += timer.every;
            let delivered = timer.ticks.unbounded_send(at).is_ok();
            state.now = at;
            if !delivered {
                state.timers.retain(|timer| !timer.ticks.is_closed());
            }
        }

        state.now = target;
    }

    /// Number of tick streams still alive.
    pub fn active_timers(&self) -> usize {
        self.inner
            .lock()
            .timers
            .iter()
            .filter(|timer| !timer.ticks.is_closed())
            .count()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Duration {
        self.inner.lock().now
    }

    fn ticks(&self, every: Duration) -> BoxStream<'static, Duration> {
        let every = every.max(MIN_TICK);
        let (ticks, receiver) = mpsc::unbounded();
        let mut state = self.inner.lock();
        let next = state.now + every;
        state.timers.push(TestTimer { every, next, ticks });
        receiver.boxed()
    }
}
