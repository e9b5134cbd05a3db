//! Base trait for store state.

/// Marker trait for state held by a [`Store`](super::Store).
///
/// States should be:
/// - Value-like (Clone to publish snapshots to observers)
/// - Comparable (PartialEq for change detection when publishing and scoping)
/// - Shareable across the runtime (Send + Sync)
pub trait State: Clone + PartialEq + Send + Sync + 'static {}

impl<T> State for T where T: Clone + PartialEq + Send + Sync + 'static {}
