//! Structural projections: lift reducers over a child field, an optional
//! field, or a collection of children.
//!
//! ```text
//!            Lens<S, Child>           CasePath<A, ChildAction>
//! Parent S ────────────────→ Child   Parent A ─extract─→ ChildAction
//!                                             ←─embed───
//! ```
//!
//! Effects returned by a child reducer are mapped through `embed` and pulled
//! back over the environment projection, so they run in the parent store.

use std::any::type_name;

use super::action::{Action, Environment};
use super::effect::{Effect, Effects};
use super::identified::{Identifiable, IdentifiedVec};
use super::reducer::Reducer;
use super::state::State;

/// Getter pair focusing a parent value on one of its parts.
pub struct Lens<W, P> {
    get: fn(&W) -> &P,
    get_mut: fn(&mut W) -> &mut P,
}

impl<W, P> Lens<W, P> {
    pub const fn new(get: fn(&W) -> &P, get_mut: fn(&mut W) -> &mut P) -> Self {
        Self { get, get_mut }
    }

    pub fn get<'a>(&self, whole: &'a W) -> &'a P {
        (self.get)(whole)
    }

    pub fn get_mut<'a>(&self, whole: &'a mut W) -> &'a mut P {
        (self.get_mut)(whole)
    }

    pub fn set(&self, whole: &mut W, part: P) {
        *self.get_mut(whole) = part;
    }
}

impl<W, P> Clone for Lens<W, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W, P> Copy for Lens<W, P> {}

/// Extract/embed pair relating a parent action enum to one of its cases.
pub struct CasePath<W, P> {
    extract: fn(W) -> Option<P>,
    embed: fn(P) -> W,
}

impl<W, P> CasePath<W, P> {
    pub const fn new(extract: fn(W) -> Option<P>, embed: fn(P) -> W) -> Self {
        Self { extract, embed }
    }

    pub fn extract(&self, whole: W) -> Option<P> {
        (self.extract)(whole)
    }

    pub fn embed(&self, part: P) -> W {
        (self.embed)(part)
    }
}

impl<W, P> Clone for CasePath<W, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W, P> Copy for CasePath<W, P> {}

fn lift<A, E, PA, PE>(
    effects: Effects<A, E>,
    embed: impl Fn(A) -> PA + Clone + Send + Sync + 'static,
    environment: fn(&PE) -> E,
) -> Effects<PA, PE>
where
    A: Send + 'static,
    E: Send + 'static,
    PA: Send + 'static,
    PE: Send + 'static,
{
    effects
        .into_iter()
        .map(|effect: Effect<A, E>| effect.map(embed.clone()).pullback(environment))
        .collect()
}

/// A child reducer running on one field of the parent state.
pub struct Pullback<R: Reducer, S, A, E> {
    child: R,
    state: Lens<S, R::State>,
    action: CasePath<A, R::Action>,
    environment: fn(&E) -> R::Environment,
}

impl<R: Reducer, S, A, E> Pullback<R, S, A, E> {
    pub fn new(
        child: R,
        state: Lens<S, R::State>,
        action: CasePath<A, R::Action>,
        environment: fn(&E) -> R::Environment,
    ) -> Self {
        Self {
            child,
            state,
            action,
            environment,
        }
    }
}

impl<R, S, A, E> Reducer for Pullback<R, S, A, E>
where
    R: Reducer,
    S: State,
    A: Action,
    E: Environment,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effects<A, E> {
        let Some(child_action) = self.action.extract(action) else {
            return Vec::new();
        };
        let child_environment = (self.environment)(environment);
        let effects = self.child.reduce(
            self.state.get_mut(state),
            child_action,
            &child_environment,
        );
        lift(effects, self.action.embed, self.environment)
    }
}

/// A child reducer running on an optional field, only while it is `Some`.
pub struct IfLet<R: Reducer, S, A, E> {
    child: R,
    state: Lens<S, Option<R::State>>,
    action: CasePath<A, R::Action>,
    environment: fn(&E) -> R::Environment,
}

impl<R: Reducer, S, A, E> IfLet<R, S, A, E> {
    pub fn new(
        child: R,
        state: Lens<S, Option<R::State>>,
        action: CasePath<A, R::Action>,
        environment: fn(&E) -> R::Environment,
    ) -> Self {
        Self {
            child,
            state,
            action,
            environment,
        }
    }
}

impl<R, S, A, E> Reducer for IfLet<R, S, A, E>
where
    R: Reducer,
    S: State,
    A: Action,
    E: Environment,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effects<A, E> {
        let Some(child_action) = self.action.extract(action) else {
            return Vec::new();
        };
        let Some(child_state) = self.state.get_mut(state).as_mut() else {
            tracing::error!(
                reducer = type_name::<R>(),
                action = ?child_action,
                "optional: action sent while child state is absent; ignoring"
            );
            return Vec::new();
        };
        let child_environment = (self.environment)(environment);
        let effects = self
            .child
            .reduce(child_state, child_action, &child_environment);
        lift(effects, self.action.embed, self.environment)
    }
}

/// An element reducer running on one entry of a `Vec`, addressed by index.
pub struct ForEach<R: Reducer, S, A, E> {
    element: R,
    elements: Lens<S, Vec<R::State>>,
    action: CasePath<A, (usize, R::Action)>,
    environment: fn(&E) -> R::Environment,
}

impl<R: Reducer, S, A, E> ForEach<R, S, A, E> {
    pub fn new(
        element: R,
        elements: Lens<S, Vec<R::State>>,
        action: CasePath<A, (usize, R::Action)>,
        environment: fn(&E) -> R::Environment,
    ) -> Self {
        Self {
            element,
            elements,
            action,
            environment,
        }
    }
}

impl<R, S, A, E> Reducer for ForEach<R, S, A, E>
where
    R: Reducer,
    S: State,
    A: Action,
    E: Environment,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effects<A, E> {
        let Some((index, element_action)) = self.action.extract(action) else {
            return Vec::new();
        };
        let elements = self.elements.get_mut(state);
        let len = elements.len();
        let Some(element) = elements.get_mut(index) else {
            tracing::error!(
                reducer = type_name::<R>(),
                index,
                len,
                action = ?element_action,
                "for_each: action targets a missing element; ignoring"
            );
            return Vec::new();
        };
        let element_environment = (self.environment)(environment);
        let effects = self
            .element
            .reduce(element, element_action, &element_environment);
        let embed = self.action.embed;
        lift(effects, move |action| embed((index, action)), self.environment)
    }
}

/// An element reducer running on one entry of an [`IdentifiedVec`],
/// addressed by id.
pub struct ForEachKeyed<R, S, A, E>
where
    R: Reducer,
    R::State: Identifiable,
{
    element: R,
    elements: Lens<S, IdentifiedVec<R::State>>,
    action: CasePath<A, (<R::State as Identifiable>::Id, R::Action)>,
    environment: fn(&E) -> R::Environment,
}

impl<R, S, A, E> ForEachKeyed<R, S, A, E>
where
    R: Reducer,
    R::State: Identifiable,
{
    pub fn new(
        element: R,
        elements: Lens<S, IdentifiedVec<R::State>>,
        action: CasePath<A, (<R::State as Identifiable>::Id, R::Action)>,
        environment: fn(&E) -> R::Environment,
    ) -> Self {
        Self {
            element,
            elements,
            action,
            environment,
        }
    }
}

impl<R, S, A, E> Reducer for ForEachKeyed<R, S, A, E>
where
    R: Reducer,
    R::State: Identifiable,
    S: State,
    A: Action,
    E: Environment,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effects<A, E> {
        let Some((id, element_action)) = self.action.extract(action) else {
            return Vec::new();
        };
        let Some(element) = self.elements.get_mut(state).get_mut(&id) else {
            tracing::error!(
                reducer = type_name::<R>(),
                id = ?id,
                action = ?element_action,
                "for_each_keyed: action targets a missing element; ignoring"
            );
            return Vec::new();
        };
        let element_environment = (self.environment)(environment);
        let effects = self
            .element
            .reduce(element, element_action, &element_environment);
        let embed = self.action.embed;
        lift(
            effects,
            move |action| embed((id.clone(), action)),
            self.environment,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::{reducer_fn, Effect, EffectId, EffectKind, ReducerExt};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum CounterAction {
        Increment,
        Tick,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Parent {
        counter: Counter,
        maybe: Option<Counter>,
        counters: Vec<Counter>,
        untouched: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ParentAction {
        Counter(CounterAction),
        Maybe(CounterAction),
        Row(usize, CounterAction),
        Rename(String),
    }

    #[derive(Clone)]
    struct ParentEnv {
        step: i32,
    }

    fn counter_reducer() -> impl Reducer<State = Counter, Action = CounterAction, Environment = i32>
    {
        reducer_fn(|state: &mut Counter, action: CounterAction, step: &i32| match action {
            CounterAction::Increment => {
                state.value += *step;
                vec![Effect::send(CounterAction::Tick).cancellable(EffectId::new("tick"))]
            }
            CounterAction::Tick => Vec::new(),
        })
    }

    fn step(env: &ParentEnv) -> i32 {
        env.step
    }

    fn counter() -> Lens<Parent, Counter> {
        Lens::new(|p| &p.counter, |p| &mut p.counter)
    }

    fn counter_action() -> CasePath<ParentAction, CounterAction> {
        CasePath::new(
            |action| match action {
                ParentAction::Counter(action) => Some(action),
                _ => None,
            },
            ParentAction::Counter,
        )
    }

    #[test]
    fn lens_reads_and_writes_the_focused_field() {
        let mut parent = Parent::default();
        counter().set(&mut parent, Counter { value: 4 });
        assert_eq!(counter().get(&parent).value, 4);
    }

    #[test]
    fn pullback_runs_child_on_matching_action() {
        let reducer = counter_reducer().pullback(counter(), counter_action(), step);
        let mut parent = Parent::default();
        let env = ParentEnv { step: 2 };

        let effects = reducer.reduce(&mut parent, ParentAction::Counter(CounterAction::Increment), &env);
        assert_eq!(parent.counter.value, 2);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind(), EffectKind::Cancellable(&EffectId::new("tick")));
    }

    #[test]
    fn pullback_ignores_other_actions() {
        let reducer = counter_reducer().pullback(counter(), counter_action(), step);
        let mut parent = Parent::default();
        let before = parent.clone();

        let effects = reducer.reduce(&mut parent, ParentAction::Rename("x".into()), &ParentEnv { step: 1 });
        assert!(effects.is_empty());
        assert_eq!(parent, before);
    }

    #[test]
    fn optional_only_runs_while_present() {
        let reducer = counter_reducer().optional(
            Lens::new(|p: &Parent| &p.maybe, |p| &mut p.maybe),
            CasePath::new(
                |action| match action {
                    ParentAction::Maybe(action) => Some(action),
                    _ => None,
                },
                ParentAction::Maybe,
            ),
            step,
        );
        let env = ParentEnv { step: 1 };
        let mut parent = Parent::default();

        let effects = reducer.reduce(&mut parent, ParentAction::Maybe(CounterAction::Increment), &env);
        assert!(effects.is_empty());
        assert_eq!(parent.maybe, None);

        parent.maybe = Some(Counter::default());
        let effects = reducer.reduce(&mut parent, ParentAction::Maybe(CounterAction::Increment), &env);
        assert_eq!(effects.len(), 1);
        assert_eq!(parent.maybe, Some(Counter { value: 1 }));
    }

    fn rows_reducer() -> impl Reducer<State = Parent, Action = ParentAction, Environment = ParentEnv> {
        counter_reducer().for_each(
            Lens::new(|p: &Parent| &p.counters, |p| &mut p.counters),
            CasePath::new(
                |action| match action {
                    ParentAction::Row(index, action) => Some((index, action)),
                    _ => None,
                },
                |(index, action)| ParentAction::Row(index, action),
            ),
            step,
        )
    }

    #[test]
    fn for_each_mutates_only_the_addressed_element() {
        let reducer = rows_reducer();
        let mut parent = Parent {
            counters: vec![Counter { value: 1 }, Counter { value: 2 }, Counter { value: 3 }],
            untouched: "keep".into(),
            ..Parent::default()
        };
        let before = parent.clone();

        reducer.reduce(&mut parent, ParentAction::Row(1, CounterAction::Increment), &ParentEnv { step: 10 });

        assert_eq!(parent.counters[0], before.counters[0]);
        assert_eq!(parent.counters[1], Counter { value: 12 });
        assert_eq!(parent.counters[2], before.counters[2]);
        assert_eq!(parent.untouched, "keep");
    }

    #[test]
    fn for_each_missing_index_is_noop() {
        let reducer = rows_reducer();
        let mut parent = Parent {
            counters: vec![Counter { value: 1 }],
            ..Parent::default()
        };
        let before = parent.clone();

        let effects = reducer.reduce(&mut parent, ParentAction::Row(5, CounterAction::Increment), &ParentEnv { step: 1 });
        assert!(effects.is_empty());
        assert_eq!(parent, before);
    }
}
