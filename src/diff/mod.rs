//! Change detection between props snapshots.
//!
//! Comparison is shallow: object and array values are compared field by
//! field one level deep, and those fields by identity.

mod diff;
mod shallow;

pub use diff::{compute_diff, Diff};
pub use shallow::{differs, shallow_equal};
