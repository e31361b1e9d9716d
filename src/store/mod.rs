//! Application state container.
//!
//! A store owns a single state object. Writers shallow-merge partial
//! objects into it, and every write synchronously notifies the registered
//! listeners in subscription order.

mod store;

pub(crate) use store::WeakStore;
pub use store::{Store, Subscription};
