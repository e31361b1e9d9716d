//! # Zerostore
//!
//! A minimal state store with shallow-diffed component bindings.
//!
//! Zerostore has two layers:
//!
//! ## Store
//!
//! A single owned state object:
//! - `Store` - Shallow-merging writes with synchronous, ordered notification
//! - `Actions` - Named reducers bound to a store
//!
//! ## Bindings
//!
//! Keeping UI components in sync with a store:
//! - `Component` - The contract a bindable component offers
//! - `connect` - Project state into props and push only what changed
//! - `compute_diff` - The shallow diff behind update suppression

pub mod actions;
pub mod component;
pub mod connect;
pub mod diff;
pub mod error;
pub mod store;
pub mod value;

// Re-export main types for convenience
pub use actions::{bind_actions, get_actions, Actions, BoundAction, BoundActions};
pub use component::{Component, Instance};
pub use connect::{connect, Connection, ConnectionState};
pub use diff::{compute_diff, differs, shallow_equal, Diff};
pub use error::{Error, Result};
pub use store::{Store, Subscription};
pub use value::{object_from_json, Object, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::from_json(json!({ "count": 0 })).unwrap();
        let view = Arc::new(Instance::new());
        let _connection = connect(view.clone(), &store, |state: &Object| state.clone());

        store.set_state(object_from_json(json!({ "count": 42 })).unwrap());
        assert_eq!(view.get("count"), Some(Value::from(42)));
    }
}
