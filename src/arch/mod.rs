//! Unidirectional state-container primitives.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Store ──→ Reducer ──→ State ──→ observers / scoped stores
//!    ↑                    │
//!    └──── Effect ←───────┘   (run against the Environment)
//! ```
//!
//! - **State**: value-like snapshot owned by exactly one store
//! - **Action**: what happened (user input, timer tick, effect result)
//! - **Reducer**: mutates state for an action and returns effects
//! - **Effect**: description of async work yielding follow-up actions
//! - **Store**: serializes reduction and runs effects

mod action;
mod cancel;
mod compose;
mod effect;
mod identified;
mod observers;
mod reducer;
mod state;
mod store;

pub use action::{Action, Environment};
pub use cancel::EffectId;
pub use compose::{CasePath, ForEach, ForEachKeyed, IfLet, Lens, Pullback};
pub use effect::{Effect, EffectKind, Effects, IntoEffect};
pub use identified::{Identifiable, IdentifiedVec};
pub use reducer::{combine, reducer_fn, AnyReducer, Combine, Combined, FnReducer, Reducer, ReducerExt};
pub use state::State;
pub use store::{Store, StoreError, Subscription};
