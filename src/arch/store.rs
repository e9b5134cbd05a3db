//! Store runtime: owns the state, serializes action processing and runs
//! effects against the environment.
//!
//! # Architecture
//!
//! ```text
//! dispatch(action) ──→ inbox (mpsc) ──→ loop task ──→ Reducer::reduce
//!        ↑                                   │
//!        │                      publish state (scopes, watch, subscribers)
//!        │                                   │
//!        └──── effect tasks ←── Effect::start(env)
//! ```
//!
//! Exactly one loop task per root store touches the state. Actions from any
//! thread, and actions produced by effects, funnel through one unbounded
//! channel and are reduced one at a time in FIFO order.

use std::any::type_name;
use std::sync::{Arc, Weak};

use futures::StreamExt;
use parking_lot::ReentrantMutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;

use super::action::Action;
use super::cancel::{Cancellations, Delivery, EffectId};
use super::effect::Effect;
use super::observers::Observers;
use super::reducer::Reducer;
use super::state::State;

/// Errors surfaced to hosts dispatching into a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The processing loop is gone (its runtime shut down).
    #[error("store is closed")]
    Closed,
}

type Dispatcher<A> = Arc<dyn Fn(A) -> Result<(), StoreError> + Send + Sync>;

/// Handle to a running store.
///
/// Cloning is cheap and every clone addresses the same store. A store created
/// with [`scope`](Self::scope) presents a projection of its parent's state and
/// forwards its actions to the parent.
///
/// The processing loop stops when the last handle (including scoped handles)
/// is dropped; at that point running effects are aborted and every
/// registered effect identity is cancelled.
pub struct Store<S, A> {
    shared: Arc<Shared<S>>,
    dispatcher: Dispatcher<A>,
    lifetime: Arc<Lifetime>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            dispatcher: Arc::clone(&self.dispatcher),
            lifetime: Arc::clone(&self.lifetime),
        }
    }
}

/// Published state of one store (root or scoped) and its observers.
struct Shared<S> {
    state: watch::Sender<S>,
    /// Scoped stores. Updated before `state`, so a scoped store never lags
    /// behind a value readers can already see on its parent.
    children: Observers<S>,
    subscribers: Observers<S>,
    /// Held while publishing and while attaching a scoped store.
    publishing: ReentrantMutex<()>,
}

impl<S: State> Shared<S> {
    fn new(initial: S) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            children: Observers::new(),
            subscribers: Observers::new(),
            publishing: ReentrantMutex::new(()),
        }
    }

    /// Store `next` and notify observers, unless it equals the last value.
    fn publish(&self, next: &S) -> bool {
        let _publishing = self.publishing.lock();
        if *self.state.borrow() == *next {
            return false;
        }
        self.children.notify(next);
        self.state.send_replace(next.clone());
        self.subscribers.notify(next);
        true
    }
}

/// Keeps the root loop alive; shared by the root and all scoped handles.
struct Lifetime {
    _closed: oneshot::Sender<()>,
    cancellations: Cancellations,
}

impl<S: State, A: Action> Store<S, A> {
    /// Create a store and spawn its processing loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<R>(initial: S, reducer: R, environment: R::Environment) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        let (closed_tx, closed) = oneshot::channel();
        let shared = Arc::new(Shared::new(initial.clone()));
        let cancellations = Cancellations::default();

        let runtime = Runtime {
            state: initial,
            reducer,
            environment,
            shared: Arc::clone(&shared),
            inbox,
            feedback: inbox_tx.clone(),
            cancellations: cancellations.clone(),
            tasks: JoinSet::new(),
        };
        tokio::spawn(runtime.run(closed));

        let dispatcher: Dispatcher<A> = Arc::new(move |action| {
            inbox_tx
                .send(Delivery::new(action))
                .map_err(|_| StoreError::Closed)
        });

        Self {
            shared,
            dispatcher,
            lifetime: Arc::new(Lifetime {
                _closed: closed_tx,
                cancellations,
            }),
        }
    }

    /// Enqueue `action`. Returns immediately; the state changes later on the
    /// store's loop.
    pub fn dispatch(&self, action: A) {
        if let Err(err) = (self.dispatcher)(action) {
            tracing::debug!(store = type_name::<S>(), error = %err, "action dropped");
        }
    }

    /// Like [`dispatch`](Self::dispatch), but reports a closed store.
    pub fn try_dispatch(&self, action: A) -> Result<(), StoreError> {
        (self.dispatcher)(action)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> S {
        self.shared.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with_state<T>(&self, read: impl FnOnce(&S) -> T) -> T {
        read(&self.shared.state.borrow())
    }

    /// A receiver that is marked changed whenever the state changes.
    pub fn observe(&self) -> watch::Receiver<S> {
        self.shared.state.subscribe()
    }

    /// Call `callback` with every new state.
    ///
    /// Callbacks run on the store's loop right after the reducer returns and
    /// the new state is readable through [`state`](Self::state), so they must
    /// be quick and must not block.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = self.shared.subscribers.insert(move |state: &S| {
            callback(state);
            true
        });
        let target: Weak<dyn Unsubscribe> = Arc::downgrade(&self.shared) as Weak<dyn Unsubscribe>;
        Subscription { target, id }
    }

    /// Number of observers: subscriptions plus scoped stores. A dropped
    /// scoped store is pruned on the next change of this store's state or
    /// the next call to [`scope`](Self::scope).
    pub fn observer_count(&self) -> usize {
        self.shared.children.len() + self.shared.subscribers.len()
    }

    /// Whether an effect registered under `id` is running in the root store.
    pub fn is_effect_running(&self, id: &EffectId) -> bool {
        self.lifetime.cancellations.is_running(id)
    }

    /// Derive a child store.
    ///
    /// The child's state is `project(parent)`, recomputed on the parent's loop
    /// after every parent state change and published only when it differs.
    /// Actions sent to the child are forwarded to the parent as `embed(action)`.
    pub fn scope<S2, A2, P, Em>(&self, project: P, embed: Em) -> Store<S2, A2>
    where
        S2: State,
        A2: Action,
        P: Fn(&S) -> S2 + Send + Sync + 'static,
        Em: Fn(A2) -> A + Send + Sync + 'static,
    {
        let child = {
            // The parent cannot publish between projecting the initial value
            // and attaching the child.
            let _publishing = self.shared.publishing.lock();
            let child = Arc::new(Shared::new(project(&self.shared.state.borrow())));
            self.shared
                .children
                .insert_weak(Arc::downgrade(&child), move |child, parent: &S| {
                    child.publish(&project(parent));
                });
            child
        };

        let parent = Arc::clone(&self.dispatcher);
        Store {
            shared: child,
            dispatcher: Arc::new(move |action| parent(embed(action))),
            lifetime: Arc::clone(&self.lifetime),
        }
    }
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<S: Send + Sync> Unsubscribe for Shared<S> {
    fn unsubscribe(&self, id: u64) {
        self.subscribers.remove(id);
    }
}

/// Active [`Store::subscribe`] registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    target: Weak<dyn Unsubscribe>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(target) = self.target.upgrade() {
            target.unsubscribe(self.id);
        }
    }
}

/// The root store's processing loop.
struct Runtime<R: Reducer> {
    state: R::State,
    reducer: R,
    environment: R::Environment,
    shared: Arc<Shared<R::State>>,
    inbox: mpsc::UnboundedReceiver<Delivery<R::Action>>,
    feedback: mpsc::UnboundedSender<Delivery<R::Action>>,
    cancellations: Cancellations,
    tasks: JoinSet<()>,
}

impl<R: Reducer> Runtime<R> {
    async fn run(mut self, mut closed: oneshot::Receiver<()>) {
        let store = type_name::<R::State>();
        tracing::debug!(store, "store started");

        loop {
            tokio::select! {
                biased;
                _ = &mut closed => break,
                Some(delivery) = self.inbox.recv() => self.process(delivery),
                Some(finished) = self.tasks.join_next() => {
                    if let Err(err) = finished {
                        if err.is_panic() {
                            tracing::warn!(store, error = %err, "effect task panicked");
                        }
                    }
                }
                else => break,
            }
        }

        self.cancellations.cancel_all();
        self.tasks.abort_all();
        tracing::debug!(store, pending_effects = self.tasks.len(), "store torn down");
    }

    fn process(&mut self, delivery: Delivery<R::Action>) {
        let store = type_name::<R::State>();
        if !delivery.is_live() {
            tracing::trace!(store, "dropping action from cancelled effect");
            return;
        }

        let action = delivery.into_action();
        tracing::debug!(store, action = ?action, "processing action");
        let effects = self
            .reducer
            .reduce(&mut self.state, action, &self.environment);

        let changed = self.shared.publish(&self.state);
        tracing::trace!(store, changed, effects = effects.len(), "action reduced");

        for effect in effects {
            self.start(effect);
        }
    }

    fn start(&mut self, effect: Effect<R::Action, R::Environment>) {
        if effect.is_none() {
            return;
        }
        tracing::trace!(effect = ?effect, "starting effect");
        let mut deliveries = effect.start(&self.environment, &self.cancellations);
        let feedback = self.feedback.clone();
        self.tasks.spawn(async move {
            while let Some(delivery) = deliveries.next().await {
                if feedback.send(delivery).is_err() {
                    break;
                }
            }
        });
    }
}
