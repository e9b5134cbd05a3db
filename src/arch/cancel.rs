//! Effect identities and the cancellation registry.
//!
//! Every running cancellable effect is registered under its [`EffectId`]
//! together with an abort handle. Actions produced inside a cancellable scope
//! carry that scope's handle so the store can drop deliveries that were
//! already queued when the scope was cancelled.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::AbortHandle;
use parking_lot::Mutex;

/// Identity of a long-running effect, used to cancel it.
///
/// Ids compare by their textual name, so two effects started with the same
/// name share an identity: cancelling one cancels both.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EffectId(Arc<str>);

impl EffectId {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Id for one member of a family of effects, e.g. the timer of a single
    /// list element: `EffectId::scoped("memo.timer", url.display())`.
    pub fn scoped(scope: &str, key: impl fmt::Display) -> Self {
        Self(format!("{scope}/{key}").into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EffectId").field(&&*self.0).finish()
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EffectId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// An action on its way back into the store.
pub(crate) struct Delivery<A> {
    action: A,
    scopes: Vec<AbortHandle>,
}

impl<A> Delivery<A> {
    pub(crate) fn new(action: A) -> Self {
        Self {
            action,
            scopes: Vec::new(),
        }
    }

    /// Tag the delivery as produced inside the cancellable scope of `handle`.
    pub(crate) fn within(mut self, handle: &AbortHandle) -> Self {
        self.scopes.push(handle.clone());
        self
    }

    /// False once any enclosing cancellable scope has been cancelled.
    pub(crate) fn is_live(&self) -> bool {
        self.scopes.iter().all(|scope| !scope.is_aborted())
    }

    pub(crate) fn into_action(self) -> A {
        self.action
    }
}

/// Registry of running cancellable effects, shared by one store and all of
/// the effect streams it started.
#[derive(Clone, Default)]
pub(crate) struct Cancellations {
    inner: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    next_serial: u64,
    running: HashMap<EffectId, Vec<(u64, AbortHandle)>>,
}

impl Cancellations {
    /// Register a running effect. The entry is removed when the returned
    /// registration is dropped, which happens when the effect stream ends.
    pub(crate) fn register(&self, id: &EffectId, handle: AbortHandle) -> Registration {
        let mut registry = self.inner.lock();
        let serial = registry.next_serial;
        registry.next_serial += 1;
        registry
            .running
            .entry(id.clone())
            .or_default()
            .push((serial, handle));
        Registration {
            cancellations: self.clone(),
            id: id.clone(),
            serial,
        }
    }

    /// Cancel every effect running under `id`. Unknown ids are a no-op.
    ///
    /// Returns the number of effects that were cancelled.
    pub(crate) fn cancel(&self, id: &EffectId) -> usize {
        let handles = self.inner.lock().running.remove(id).unwrap_or_default();
        for (_, handle) in &handles {
            handle.abort();
        }
        if !handles.is_empty() {
            tracing::trace!(effect_id = %id, count = handles.len(), "effects cancelled");
        }
        handles.len()
    }

    /// Cancel everything. Used when the owning store is torn down.
    pub(crate) fn cancel_all(&self) {
        let running = std::mem::take(&mut self.inner.lock().running);
        for (_, handles) in running {
            for (_, handle) in handles {
                handle.abort();
            }
        }
    }

    pub(crate) fn is_running(&self, id: &EffectId) -> bool {
        self.inner.lock().running.contains_key(id)
    }

    fn unregister(&self, id: &EffectId, serial: u64) {
        let mut registry = self.inner.lock();
        if let Some(handles) = registry.running.get_mut(id) {
            handles.retain(|(entry, _)| *entry != serial);
            if handles.is_empty() {
                registry.running.remove(id);
            }
        }
    }
}

/// Keeps a cancellable effect listed in the registry while it is alive.
pub(crate) struct Registration {
    cancellations: Cancellations,
    id: EffectId,
    serial: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.cancellations.unregister(&self.id, self.serial);
    }
}
