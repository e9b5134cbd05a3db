//! Reducer trait and the combinators that build larger reducers from smaller ones.

use std::marker::PhantomData;

use super::action::{Action, Environment};
use super::compose::{CasePath, ForEach, ForEachKeyed, IfLet, Lens, Pullback};
use super::effect::Effects;
use super::identified::{Identifiable, IdentifiedVec};
use super::state::State;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen. It must be
/// deterministic and total: every action variant is handled, and the
/// returned effects are the only way it reaches the outside world.
pub trait Reducer: Send + 'static {
    /// The state type this reducer operates on.
    type State: State;

    /// The action type this reducer handles.
    type Action: Action;

    /// The environment the returned effects run against.
    type Environment: Environment;

    /// Mutate `state` in place for `action` and describe follow-up work.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> Effects<Self::Action, Self::Environment>;
}

/// A reducer backed by a closure. Built with [`reducer_fn`].
pub struct FnReducer<F, S, A, E> {
    reduce: F,
    _marker: PhantomData<fn(&mut S, A, &E)>,
}

/// Wrap a closure `(state, action, environment) -> effects` as a reducer.
pub fn reducer_fn<S, A, E, F>(reduce: F) -> FnReducer<F, S, A, E>
where
    F: Fn(&mut S, A, &E) -> Effects<A, E> + Send + 'static,
{
    FnReducer {
        reduce,
        _marker: PhantomData,
    }
}

impl<F, S, A, E> Reducer for FnReducer<F, S, A, E>
where
    F: Fn(&mut S, A, &E) -> Effects<A, E> + Send + 'static,
    S: State,
    A: Action,
    E: Environment,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effects<A, E> {
        (self.reduce)(state, action, environment)
    }
}

/// A type-erased reducer, so reducers of different concrete types can be
/// stored and combined behind one interface.
pub struct AnyReducer<S, A, E> {
    inner: Box<dyn Reducer<State = S, Action = A, Environment = E>>,
}

impl<S, A, E> AnyReducer<S, A, E>
where
    S: State,
    A: Action,
    E: Environment,
{
    pub fn new<R>(reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        Self {
            inner: Box::new(reducer),
        }
    }
}

impl<S, A, E> Reducer for AnyReducer<S, A, E>
where
    S: State,
    A: Action,
    E: Environment,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effects<A, E> {
        self.inner.reduce(state, action, environment)
    }
}

/// Two reducers run in sequence on the same state. See [`ReducerExt::combine`].
pub struct Combine<R1, R2> {
    first: R1,
    second: R2,
}

impl<R1, R2> Reducer for Combine<R1, R2>
where
    R1: Reducer,
    R2: Reducer<State = R1::State, Action = R1::Action, Environment = R1::Environment>,
{
    type State = R1::State;
    type Action = R1::Action;
    type Environment = R1::Environment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> Effects<Self::Action, Self::Environment> {
        let mut effects = self.first.reduce(state, action.clone(), environment);
        effects.extend(self.second.reduce(state, action, environment));
        effects
    }
}

/// Any number of reducers run in sequence. Built with [`combine`].
pub struct Combined<S, A, E> {
    reducers: Vec<AnyReducer<S, A, E>>,
}

/// Combine reducers into one: each child sees the state left by the children
/// before it, and effects are concatenated in child order.
pub fn combine<S, A, E>(reducers: Vec<AnyReducer<S, A, E>>) -> Combined<S, A, E> {
    Combined { reducers }
}

impl<S, A, E> Reducer for Combined<S, A, E>
where
    S: State,
    A: Action,
    E: Environment,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(&self, state: &mut S, action: A, environment: &E) -> Effects<A, E> {
        let mut effects = Vec::new();
        for reducer in &self.reducers {
            effects.extend(reducer.reduce(state, action.clone(), environment));
        }
        effects
    }
}

/// Combinators available on every reducer.
pub trait ReducerExt: Reducer + Sized {
    fn boxed(self) -> AnyReducer<Self::State, Self::Action, Self::Environment> {
        AnyReducer::new(self)
    }

    /// Run `self`, then `other`, on the same state and action.
    fn combine<R>(self, other: R) -> Combine<Self, R>
    where
        R: Reducer<State = Self::State, Action = Self::Action, Environment = Self::Environment>,
    {
        Combine {
            first: self,
            second: other,
        }
    }

    /// Lift this reducer into a parent state, action and environment.
    ///
    /// Parent actions that `action` does not extract are ignored.
    fn pullback<S, A, E>(
        self,
        state: Lens<S, Self::State>,
        action: CasePath<A, Self::Action>,
        environment: fn(&E) -> Self::Environment,
    ) -> Pullback<Self, S, A, E> {
        Pullback::new(self, state, action, environment)
    }

    /// Lift this reducer into an optional field of a parent state.
    fn optional<S, A, E>(
        self,
        state: Lens<S, Option<Self::State>>,
        action: CasePath<A, Self::Action>,
        environment: fn(&E) -> Self::Environment,
    ) -> IfLet<Self, S, A, E> {
        IfLet::new(self, state, action, environment)
    }

    /// Lift this element reducer over a `Vec` of elements addressed by index.
    fn for_each<S, A, E>(
        self,
        elements: Lens<S, Vec<Self::State>>,
        action: CasePath<A, (usize, Self::Action)>,
        environment: fn(&E) -> Self::Environment,
    ) -> ForEach<Self, S, A, E> {
        ForEach::new(self, elements, action, environment)
    }

    /// Lift this element reducer over an [`IdentifiedVec`] addressed by id.
    fn for_each_keyed<S, A, E>(
        self,
        elements: Lens<S, IdentifiedVec<Self::State>>,
        action: CasePath<A, (<Self::State as Identifiable>::Id, Self::Action)>,
        environment: fn(&E) -> Self::Environment,
    ) -> ForEachKeyed<Self, S, A, E>
    where
        Self::State: Identifiable,
    {
        ForEachKeyed::new(self, elements, action, environment)
    }
}

impl<R: Reducer> ReducerExt for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::{Effect, EffectKind};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Tally {
        count: i32,
        log: Vec<String>,
    }

    #[derive(Debug, Clone)]
    enum TallyAction {
        Add(i32),
        Double,
    }

    fn adder() -> impl Reducer<State = Tally, Action = TallyAction, Environment = ()> {
        reducer_fn(|state: &mut Tally, action: TallyAction, _: &()| {
            if let TallyAction::Add(n) = action {
                state.count += n;
                return vec![Effect::none().labeled("added")];
            }
            Vec::new()
        })
    }

    fn logger() -> impl Reducer<State = Tally, Action = TallyAction, Environment = ()> {
        reducer_fn(|state: &mut Tally, action: TallyAction, _: &()| {
            state.log.push(format!("{action:?} -> {}", state.count));
            if let TallyAction::Double = action {
                state.count *= 2;
            }
            vec![Effect::none().labeled("logged")]
        })
    }

    #[test]
    fn combine_runs_children_sequentially() {
        let reducer = adder().combine(logger());
        let mut state = Tally::default();

        let effects = reducer.reduce(&mut state, TallyAction::Add(3), &());
        assert_eq!(state.count, 3);
        // The logger observed the adder's mutation.
        assert_eq!(state.log, vec!["Add(3) -> 3".to_string()]);
        let labels: Vec<_> = effects.iter().filter_map(|e| e.label()).collect();
        assert_eq!(labels, vec!["added", "logged"]);
    }

    #[test]
    fn combine_matches_manual_sequence() {
        let combined = combine(vec![adder().boxed(), logger().boxed()]);
        let (first, second) = (adder(), logger());

        for action in [TallyAction::Add(2), TallyAction::Double, TallyAction::Add(-7)] {
            let mut via_combine = Tally { count: 5, log: Vec::new() };
            let mut via_sequence = via_combine.clone();

            let combined_effects = combined.reduce(&mut via_combine, action.clone(), &());
            let mut sequence_effects = first.reduce(&mut via_sequence, action.clone(), &());
            sequence_effects.extend(second.reduce(&mut via_sequence, action, &()));

            assert_eq!(via_combine, via_sequence);
            assert_eq!(format!("{combined_effects:?}"), format!("{sequence_effects:?}"));
        }
    }

    #[test]
    fn boxed_reducer_behaves_like_unboxed() {
        let boxed = adder().boxed();
        let mut state = Tally::default();
        let effects = boxed.reduce(&mut state, TallyAction::Add(1), &());
        assert_eq!(state.count, 1);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind(), EffectKind::None);
    }
}
