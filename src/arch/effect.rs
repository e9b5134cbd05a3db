//! Effects: descriptions of asynchronous work that feed actions back into a store.
//!
//! An [`Effect`] does nothing on its own. The store starts it against the
//! environment right after the reducer that returned it, and every action the
//! effect yields is dispatched back through the store's serialized path.
//!
//! ```text
//! Reducer ──→ [Effect] ──start(env)──→ Stream<Action> ──→ Store::dispatch
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use futures::future::{AbortHandle, Abortable};
use futures::stream::{self, BoxStream, Stream, StreamExt};

use super::cancel::{Cancellations, Delivery, EffectId, Registration};

/// Effects returned from a single reducer call.
pub type Effects<A, E> = Vec<Effect<A, E>>;

type Run<A, E> = Box<dyn FnOnce(E) -> BoxStream<'static, A> + Send>;

/// A unit of asynchronous work parameterized by an environment `E`,
/// producing zero or more actions `A`.
pub struct Effect<A, E> {
    inner: Inner<A, E>,
    label: Option<Cow<'static, str>>,
}

enum Inner<A, E> {
    None,
    Run(Run<A, E>),
    Cancellable {
        id: EffectId,
        cancel_in_flight: bool,
        effect: Box<Effect<A, E>>,
    },
    Cancel(EffectId),
    Merge(Vec<Effect<A, E>>),
    Concatenate(Vec<Effect<A, E>>),
}

/// Structural view of an effect, for tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind<'a> {
    None,
    Run,
    Cancellable(&'a EffectId),
    Cancel(&'a EffectId),
    Merge(usize),
    Concatenate(usize),
}

impl<A, E> Effect<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    fn from_inner(inner: Inner<A, E>) -> Self {
        Self { inner, label: None }
    }

    fn run<F>(start: F) -> Self
    where
        F: FnOnce(E) -> BoxStream<'static, A> + Send + 'static,
    {
        Self::from_inner(Inner::Run(Box::new(start)))
    }

    /// An effect that does nothing and completes immediately.
    pub fn none() -> Self {
        Self::from_inner(Inner::None)
    }

    /// Completes synchronously with a single action queued.
    pub fn send(action: A) -> Self {
        Self::run(move |_| stream::once(async move { action }).boxed())
    }

    /// Completes synchronously with the given actions queued in order.
    pub fn from_actions(actions: impl IntoIterator<Item = A>) -> Self {
        let actions: Vec<A> = actions.into_iter().collect();
        if actions.is_empty() {
            return Self::none();
        }
        Self::run(move |_| stream::iter(actions).boxed())
    }

    /// Runs a future against the environment and delivers its output.
    pub fn task<F, Fut>(work: F) -> Self
    where
        F: FnOnce(E) -> Fut + Send + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        Self::run(move |env| stream::once(work(env)).boxed())
    }

    /// Runs a fallible operation and delivers its outcome, success or
    /// failure, as an action.
    pub fn result<F, Fut, T, Er, M>(work: F, into_action: M) -> Self
    where
        F: FnOnce(E) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, Er>> + Send + 'static,
        M: FnOnce(Result<T, Er>) -> A + Send + 'static,
    {
        Self::task(move |env| {
            let outcome = work(env);
            async move { into_action(outcome.await) }
        })
    }

    /// A long-running sequence of actions, such as a timer.
    pub fn stream<F, St>(start: F) -> Self
    where
        F: FnOnce(E) -> St + Send + 'static,
        St: Stream<Item = A> + Send + 'static,
    {
        Self::run(move |env| start(env).boxed())
    }

    /// Performs `work` when started and completes immediately without
    /// producing actions.
    pub fn fire_and_forget<F>(work: F) -> Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        Self::run(move |env| {
            work(env);
            stream::empty().boxed()
        })
    }

    /// Runs all effects concurrently. Actions interleave as they arrive;
    /// each effect's own actions keep their order.
    pub fn merge(effects: impl IntoIterator<Item = Self>) -> Self {
        Self::from_inner(Inner::Merge(effects.into_iter().collect()))
    }

    /// Runs effects one after another. An effect is not started until the
    /// previous one has completed.
    pub fn concatenate(effects: impl IntoIterator<Item = Self>) -> Self {
        Self::from_inner(Inner::Concatenate(effects.into_iter().collect()))
    }

    /// Cancels every running effect registered under `id`.
    ///
    /// Cancelling an id that is unknown or already finished is a no-op.
    pub fn cancel(id: impl Into<EffectId>) -> Self {
        Self::from_inner(Inner::Cancel(id.into()))
    }

    /// Registers this effect under `id` while it runs.
    pub fn cancellable(self, id: impl Into<EffectId>) -> Self {
        Self::from_inner(Inner::Cancellable {
            id: id.into(),
            cancel_in_flight: false,
            effect: Box::new(self),
        })
    }

    /// Like [`cancellable`](Self::cancellable), but first cancels any effect
    /// already running under `id`.
    pub fn cancellable_in_flight(self, id: impl Into<EffectId>) -> Self {
        Self::from_inner(Inner::Cancellable {
            id: id.into(),
            cancel_in_flight: true,
            effect: Box::new(self),
        })
    }

    /// Attach a name shown in `Debug` output and store traces.
    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// All labels in this effect tree, depth first.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        self.collect_labels(&mut labels);
        labels
    }

    fn collect_labels<'a>(&'a self, into: &mut Vec<&'a str>) {
        if let Some(label) = self.label() {
            into.push(label);
        }
        for child in self.children() {
            child.collect_labels(into);
        }
    }

    pub fn kind(&self) -> EffectKind<'_> {
        match &self.inner {
            Inner::None => EffectKind::None,
            Inner::Run(_) => EffectKind::Run,
            Inner::Cancellable { id, .. } => EffectKind::Cancellable(id),
            Inner::Cancel(id) => EffectKind::Cancel(id),
            Inner::Merge(effects) => EffectKind::Merge(effects.len()),
            Inner::Concatenate(effects) => EffectKind::Concatenate(effects.len()),
        }
    }

    /// Directly nested effects (merge/concatenate members, or the wrapped
    /// effect of a cancellable).
    pub fn children(&self) -> &[Effect<A, E>] {
        match &self.inner {
            Inner::Cancellable { effect, .. } => std::slice::from_ref(&**effect),
            Inner::Merge(effects) | Inner::Concatenate(effects) => effects,
            Inner::None | Inner::Run(_) | Inner::Cancel(_) => &[],
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.inner, Inner::None)
    }

    /// Lift the produced actions into a larger action type.
    pub fn map<B, F>(self, embed: F) -> Effect<B, E>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Clone + Send + Sync + 'static,
    {
        let inner = match self.inner {
            Inner::None => Inner::None,
            Inner::Run(run) => Inner::Run(Box::new(move |env| run(env).map(embed).boxed())),
            Inner::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => Inner::Cancellable {
                id,
                cancel_in_flight,
                effect: Box::new(effect.map(embed)),
            },
            Inner::Cancel(id) => Inner::Cancel(id),
            Inner::Merge(effects) => Inner::Merge(map_all(effects, embed)),
            Inner::Concatenate(effects) => Inner::Concatenate(map_all(effects, embed)),
        };
        Effect {
            inner,
            label: self.label,
        }
    }

    /// Run against a larger environment by projecting out the part this
    /// effect needs.
    pub fn pullback<Outer, P>(self, project: P) -> Effect<A, Outer>
    where
        Outer: Send + 'static,
        P: Fn(&Outer) -> E + Clone + Send + Sync + 'static,
    {
        let inner = match self.inner {
            Inner::None => Inner::None,
            Inner::Run(run) => Inner::Run(Box::new(move |outer: Outer| run(project(&outer)))),
            Inner::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => Inner::Cancellable {
                id,
                cancel_in_flight,
                effect: Box::new(effect.pullback(project)),
            },
            Inner::Cancel(id) => Inner::Cancel(id),
            Inner::Merge(effects) => Inner::Merge(pullback_all(effects, project)),
            Inner::Concatenate(effects) => Inner::Concatenate(pullback_all(effects, project)),
        };
        Effect {
            inner,
            label: self.label,
        }
    }

    /// Start the effect. Cancels take hold and fire-and-forget work runs
    /// during this call; members of a concatenation start lazily in turn.
    pub(crate) fn start(
        self,
        env: &E,
        cancellations: &Cancellations,
    ) -> BoxStream<'static, Delivery<A>>
    where
        E: Clone + Sync,
    {
        match self.inner {
            Inner::None => stream::empty().boxed(),
            Inner::Run(run) => run(env.clone()).map(Delivery::new).boxed(),
            Inner::Cancel(id) => {
                cancellations.cancel(&id);
                stream::empty().boxed()
            }
            Inner::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => {
                if cancel_in_flight {
                    cancellations.cancel(&id);
                }
                let (handle, abort) = AbortHandle::new_pair();
                let registration = cancellations.register(&id, handle.clone());
                let deliveries = Abortable::new(effect.start(env, cancellations), abort)
                    .map(move |delivery| delivery.within(&handle))
                    .boxed();
                Registered {
                    deliveries,
                    _registration: registration,
                }
                .boxed()
            }
            Inner::Merge(effects) => {
                let streams: Vec<_> = effects
                    .into_iter()
                    .map(|effect| effect.start(env, cancellations))
                    .collect();
                stream::select_all(streams).boxed()
            }
            Inner::Concatenate(effects) => {
                let env = env.clone();
                let cancellations = cancellations.clone();
                stream::iter(effects)
                    .map(move |effect| effect.start(&env, &cancellations))
                    .flatten()
                    .boxed()
            }
        }
    }
}

fn map_all<A, B, E, F>(effects: Vec<Effect<A, E>>, embed: F) -> Vec<Effect<B, E>>
where
    A: Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
    F: Fn(A) -> B + Clone + Send + Sync + 'static,
{
    effects
        .into_iter()
        .map(|effect| effect.map(embed.clone()))
        .collect()
}

fn pullback_all<A, E, Outer, P>(effects: Vec<Effect<A, E>>, project: P) -> Vec<Effect<A, Outer>>
where
    A: Send + 'static,
    E: Send + 'static,
    Outer: Send + 'static,
    P: Fn(&Outer) -> E + Clone + Send + Sync + 'static,
{
    effects
        .into_iter()
        .map(|effect| effect.pullback(project.clone()))
        .collect()
}

/// Deliveries of a cancellable effect; unlists the effect when dropped.
struct Registered<A> {
    deliveries: BoxStream<'static, Delivery<A>>,
    _registration: Registration,
}

impl<A> Stream for Registered<A> {
    type Item = Delivery<A>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.deliveries.poll_next_unpin(cx)
    }
}

impl<A, E> Default for Effect<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::none()
    }
}

impl<A, E> fmt::Debug for Effect<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label:?}: ")?;
        }
        match &self.inner {
            Inner::None => f.write_str("None"),
            Inner::Run(_) => f.write_str("Run"),
            Inner::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => f
                .debug_struct("Cancellable")
                .field("id", id)
                .field("cancel_in_flight", cancel_in_flight)
                .field("effect", effect)
                .finish(),
            Inner::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Inner::Merge(effects) => f.debug_tuple("Merge").field(effects).finish(),
            Inner::Concatenate(effects) => f.debug_tuple("Concatenate").field(effects).finish(),
        }
    }
}

/// Erase any stream of actions into an [`Effect`].
pub trait IntoEffect<A>: Stream<Item = A> + Sized + Send + 'static {
    fn into_effect<E: Send + 'static>(self) -> Effect<A, E>;
}

impl<S, A> IntoEffect<A> for S
where
    S: Stream<Item = A> + Send + 'static,
    A: Send + 'static,
{
    fn into_effect<E: Send + 'static>(self) -> Effect<A, E> {
        Effect::stream(move |_| self)
    }
}
