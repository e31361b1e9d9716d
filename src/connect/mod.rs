//! Binding a component to a store.
//!
//! A connection projects store state into props, diffs them shallowly
//! against the component's current props and pushes only the changed keys.

mod connect;

pub use connect::{connect, Connection, ConnectionState};
