//! Dynamic values held by stores and components.
//!
//! Compound values (arrays and objects) are reference counted, so a clone
//! shares the same allocation. This is what gives identity comparison its
//! meaning: two compounds are the *same* only when they are the same
//! allocation, no matter what they contain.

mod value;

pub use value::{object_from_json, Object, Value};
