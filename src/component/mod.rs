//! The contract a UI component offers to the binding layer.

mod component;

pub use component::{Component, DestroyHandler, Instance};
