use crate::value::Value;

/// Compare two values for update suppression.
///
/// Objects are equal when they have the same keys and every field is
/// [`Value::same`]. Arrays are equal when they have the same length and every
/// element is the same. Everything else compares by identity.
///
/// # Examples
///
/// ```
/// use zerostore::{shallow_equal, Value};
/// use serde_json::json;
///
/// let a = Value::from(json!({ "count": 1 }));
/// let b = Value::from(json!({ "count": 1 }));
/// assert!(shallow_equal(&a, &b));
///
/// // Second-level compounds are compared by allocation only.
/// let a = Value::from(json!({ "inner": { "count": 1 } }));
/// let b = Value::from(json!({ "inner": { "count": 1 } }));
/// assert!(!shallow_equal(&a, &b));
/// ```
pub fn shallow_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| value.same(other)))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same(y))
        }
        _ => a.same(b),
    }
}

/// Whether a prop must be pushed to a component.
///
/// `old` is the component's last known value for the key, if any. A key the
/// component has never seen always differs.
pub fn differs(old: Option<&Value>, new: &Value) -> bool {
    match old {
        None => true,
        Some(old) if old.is_compound() => !shallow_equal(old, new),
        Some(old) => !old.same(new),
    }
}
