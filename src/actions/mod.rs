//! Named state transitions bound to a store.

mod actions;

pub use actions::{bind_actions, get_actions, Actions, BoundAction, BoundActions, Reducer};
