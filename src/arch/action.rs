//! Base traits for actions and environments.

use std::fmt::Debug;

/// Marker trait for action values.
///
/// Actions represent:
/// - User actions (button taps, text edits)
/// - System events (timer ticks, audio callbacks)
/// - Results of fallible effects, success and failure alike
///
/// Actions are processed by reducers to mutate state. They are cloned when a
/// combined reducer hands the same action to each of its children, and
/// formatted with `Debug` in store traces.
pub trait Action: Clone + Debug + Send + 'static {}

impl<T> Action for T where T: Clone + Debug + Send + 'static {}

/// Marker trait for the bundle of capabilities effects run against.
///
/// Environments are cloned for every effect that is started, so they should
/// be cheap handles (usually a struct of `Arc<dyn Capability>`).
pub trait Environment: Clone + Send + Sync + 'static {}

impl<T> Environment for T where T: Clone + Send + Sync + 'static {}
