use super::shallow::differs;
use crate::value::Object;

/// Keys whose projected value changed since the last committed props.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diff {
    /// Changed keys with their new values. Always a subset of the new props.
    pub changes: Object,
    /// Whether at least one key changed.
    pub changed: bool,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        !self.changed
    }
}

/// Diff freshly projected props against a component's current props.
///
/// Only keys of `new` are examined. Keys that exist only in `old` are left
/// alone, so the resulting diff overwrites and never removes.
///
/// # Examples
///
/// ```
/// use zerostore::{compute_diff, object_from_json};
/// use serde_json::json;
///
/// let old = object_from_json(json!({ "a": 1, "b": 2, "stale": true })).unwrap();
/// let new = object_from_json(json!({ "a": 1, "b": 3 })).unwrap();
///
/// let diff = compute_diff(&new, &old);
/// assert!(diff.changed);
/// assert_eq!(diff.changes, object_from_json(json!({ "b": 3 })).unwrap());
/// ```
pub fn compute_diff(new: &Object, old: &Object) -> Diff {
    let changes: Object = new
        .iter()
        .filter(|(key, value)| differs(old.get(key.as_str()), value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    tracing::trace!(
        examined = new.len(),
        changed = changes.len(),
        "computed props diff"
    );

    Diff {
        changed: !changes.is_empty(),
        changes,
    }
}
