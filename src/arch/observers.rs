//! Per-store observer list.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Returns `false` once the observer is gone and should be dropped.
type Callback<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Returns `false` once the observer's target has been dropped.
type Liveness = Box<dyn Fn() -> bool + Send + Sync>;

pub(crate) struct Observers<S> {
    inner: Mutex<ObserverList<S>>,
}

struct ObserverList<S> {
    next_id: u64,
    entries: Vec<(u64, Callback<S>)>,
    targets: Vec<(u64, Liveness)>,
}

impl<S> Observers<S> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(ObserverList {
                next_id: 0,
                entries: Vec::new(),
                targets: Vec::new(),
            }),
        }
    }

    pub(crate) fn insert<F>(&self, callback: F) -> u64
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        let mut list = self.inner.lock();
        let id = list.next_id;
        list.next_id += 1;
        list.entries.push((id, Arc::new(callback)));
        id
    }

    /// Register an observer that lives as long as `target`.
    ///
    /// Observers whose target is already gone are swept on every call, so a
    /// list that is never notified still cannot grow without bound.
    pub(crate) fn insert_weak<T, F>(&self, target: Weak<T>, callback: F) -> u64
    where
        S: 'static,
        T: Send + Sync + 'static,
        F: Fn(&T, &S) + Send + Sync + 'static,
    {
        self.sweep();
        let watched = Weak::clone(&target);
        let id = self.insert(move |state: &S| match target.upgrade() {
            Some(target) => {
                callback(&target, state);
                true
            }
            None => false,
        });
        self.inner
            .lock()
            .targets
            .push((id, Box::new(move || watched.strong_count() > 0)));
        id
    }

    pub(crate) fn remove(&self, id: u64) {
        let mut list = self.inner.lock();
        list.entries.retain(|(entry, _)| *entry != id);
        list.targets.retain(|(entry, _)| *entry != id);
    }

    fn sweep(&self) {
        let mut list = self.inner.lock();
        let gone: Vec<u64> = list
            .targets
            .iter()
            .filter(|(_, alive)| !alive())
            .map(|(id, _)| *id)
            .collect();
        if !gone.is_empty() {
            list.entries.retain(|(id, _)| !gone.contains(id));
            list.targets.retain(|(id, _)| !gone.contains(id));
        }
    }

    /// Call every observer with `state`, in registration order.
    ///
    /// Callbacks run without the list lock held, so they may register or
    /// remove observers on this same list.
    pub(crate) fn notify(&self, state: &S) {
        let entries: Vec<(u64, Callback<S>)> = self.inner.lock().entries.clone();
        let gone: Vec<u64> = entries
            .iter()
            .filter(|(_, callback)| !callback(state))
            .map(|(id, _)| *id)
            .collect();
        if !gone.is_empty() {
            let mut list = self.inner.lock();
            list.entries.retain(|(id, _)| !gone.contains(id));
            list.targets.retain(|(id, _)| !gone.contains(id));
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}
