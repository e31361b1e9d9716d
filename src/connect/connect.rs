use crate::component::Component;
use crate::diff::compute_diff;
use crate::error::{Error, Result};
use crate::store::{Store, Subscription, WeakStore};
use crate::value::Object;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Lifecycle of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// The initial update has not finished yet.
    Uninitialized,
    /// Listening to the store.
    Subscribed,
    /// Torn down. Terminal.
    Unsubscribed,
}

struct Binding<C: ?Sized, F> {
    component: Arc<C>,
    store: WeakStore,
    map_to_props: F,
}

impl<C, F> Binding<C, F>
where
    C: Component + ?Sized,
    F: Fn(&Object) -> Object,
{
    /// One update cycle. `None` when the store is gone.
    fn update(&self) -> Option<bool> {
        let store = self.store.upgrade()?;
        let props = (self.map_to_props)(&store.get_state());
        let diff = compute_diff(&props, &self.component.props());
        if !diff.changed {
            return Some(false);
        }
        tracing::debug!(
            keys = ?diff.changes.keys().collect::<Vec<_>>(),
            "applying props diff"
        );
        self.component.set(diff.changes);
        Some(true)
    }
}

struct Lifecycle {
    state: Mutex<ConnectionState>,
    subscription: OnceLock<Subscription>,
}

impl Lifecycle {
    fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn attach(&self, subscription: Subscription) {
        let _ = self.subscription.set(subscription);
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = ConnectionState::Subscribed;
    }

    fn release(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == ConnectionState::Unsubscribed {
            return;
        }
        *state = ConnectionState::Unsubscribed;
        if let Some(subscription) = self.subscription.get() {
            subscription.unsubscribe();
        }
        tracing::debug!("connection released");
    }
}

/// Handle to a live component binding.
///
/// Dropping the handle does not disconnect; the binding lives until the
/// component is destroyed or [`Connection::disconnect`] is called.
pub struct Connection {
    lifecycle: Arc<Lifecycle>,
    update: Arc<dyn Fn() -> Option<bool> + Send + Sync>,
}

impl Connection {
    pub fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    /// Run an update cycle outside of store notification.
    ///
    /// Returns whether any props were pushed to the component.
    pub fn update(&self) -> Result<bool> {
        if self.state() == ConnectionState::Unsubscribed {
            return Err(Error::Disconnected);
        }
        (self.update)().ok_or(Error::Disconnected)
    }

    /// Stop listening to the store. Safe to call more than once.
    pub fn disconnect(&self) {
        self.lifecycle.release();
    }
}

/// Bind `component` to `store` through the projection `map_to_props`.
///
/// The component is synced before this returns, then kept in sync on every
/// store write until it is destroyed. A panicking projection propagates out
/// of this call, or out of the `set_state` that triggered it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use zerostore::{connect, Component, Instance, Object, Store, Value};
/// use serde_json::json;
///
/// let store = Store::from_json(json!({ "message": "hello", "other": 1 })).unwrap();
/// let view = Arc::new(Instance::new());
///
/// let _connection = connect(view.clone(), &store, |state: &Object| {
///     state
///         .iter()
///         .filter(|(key, _)| key.as_str() == "message")
///         .map(|(key, value)| (key.clone(), value.clone()))
///         .collect()
/// });
/// assert_eq!(view.get("message"), Some(Value::from("hello")));
///
/// store.set_state([("message".to_string(), Value::from("hello world"))].into());
/// assert_eq!(view.get("message"), Some(Value::from("hello world")));
/// assert_eq!(view.get("other"), None);
/// ```
pub fn connect<C, F>(component: Arc<C>, store: &Store, map_to_props: F) -> Connection
where
    C: Component + ?Sized + 'static,
    F: Fn(&Object) -> Object + Send + Sync + 'static,
{
    let lifecycle = Arc::new(Lifecycle {
        state: Mutex::new(ConnectionState::Uninitialized),
        subscription: OnceLock::new(),
    });
    let binding = Arc::new(Binding {
        component: Arc::clone(&component),
        store: store.downgrade(),
        map_to_props,
    });

    binding.update();

    let subscription = {
        let binding = Arc::clone(&binding);
        store.subscribe(move || {
            binding.update();
        })
    };
    lifecycle.attach(subscription);

    component.on_destroy(Box::new({
        let lifecycle = Arc::clone(&lifecycle);
        move || lifecycle.release()
    }));

    Connection {
        lifecycle,
        update: Arc::new(move || binding.update()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Instance;
    use crate::value::{object_from_json, Value};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn obj(doc: serde_json::Value) -> Object {
        object_from_json(doc).unwrap()
    }

    fn pick(keys: &'static [&'static str]) -> impl Fn(&Object) -> Object + Send + Sync {
        move |state| {
            keys.iter()
                .filter_map(|key| state.get(*key).map(|value| (key.to_string(), value.clone())))
                .collect()
        }
    }

    #[test]
    fn initial_sync_happens_before_connect_returns() {
        let store = Store::from_json(json!({ "message": "hello" })).unwrap();
        let view = Arc::new(Instance::new());

        let connection = connect(view.clone(), &store, pick(&["message"]));

        assert_eq!(view.props(), store.get_state());
        assert_eq!(view.renders(), 1);
        assert_eq!(connection.state(), ConnectionState::Subscribed);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn unchanged_projection_is_suppressed() {
        let store = Store::from_json(json!({ "count": 1, "noise": 0 })).unwrap();
        let view = Arc::new(Instance::new());
        let connection = connect(view.clone(), &store, pick(&["count"]));

        store.set_state(obj(json!({ "noise": 1 })));
        assert_eq!(connection.update(), Ok(false));
        assert_eq!(view.renders(), 1);

        store.set_state(obj(json!({ "count": 2 })));
        assert_eq!(view.get("count"), Some(Value::from(2)));
        assert_eq!(view.renders(), 2);
    }

    #[test]
    fn manual_update_is_idempotent() {
        let store = Store::from_json(json!({ "count": 1 })).unwrap();
        let view = Arc::new(Instance::new());
        let connection = connect(view.clone(), &store, pick(&["count"]));

        assert_eq!(connection.update(), Ok(false));
        assert_eq!(connection.update(), Ok(false));
        assert_eq!(view.renders(), 1);
    }

    #[test]
    fn destroy_releases_subscription() {
        let store = Store::from_json(json!({ "count": 1 })).unwrap();
        let view = Arc::new(Instance::new());
        let connection = connect(view.clone(), &store, pick(&["count"]));

        view.destroy();

        assert_eq!(connection.state(), ConnectionState::Unsubscribed);
        assert_eq!(store.listener_count(), 0);
        assert_eq!(connection.update(), Err(Error::Disconnected));

        store.set_state(obj(json!({ "count": 5 })));
        assert_eq!(view.get("count"), Some(Value::from(1)));
    }

    #[test]
    fn disconnect_is_idempotent() {
        let store = Store::default();
        let view = Arc::new(Instance::new());
        let connection = connect(view.clone(), &store, |_: &Object| Object::new());

        connection.disconnect();
        connection.disconnect();
        view.destroy();

        assert_eq!(connection.state(), ConnectionState::Unsubscribed);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn components_keep_independent_snapshots() {
        let store = Store::from_json(json!({ "a": 1, "b": 1 })).unwrap();
        let left = Arc::new(Instance::new());
        let right = Arc::new(Instance::new());
        let _l = connect(left.clone(), &store, pick(&["a"]));
        let _r = connect(right.clone(), &store, pick(&["b"]));

        store.set_state(obj(json!({ "a": 2 })));

        assert_eq!(left.renders(), 2);
        assert_eq!(right.renders(), 1);
        assert_eq!(left.get("b"), None);
    }

    #[test]
    fn shrinking_projection_leaves_stale_props() {
        let store = Store::from_json(json!({ "show": true, "label": "x" })).unwrap();
        let view = Arc::new(Instance::new());
        let _connection = connect(view.clone(), &store, |state: &Object| {
            if state["show"].as_bool() == Some(true) {
                pick(&["show", "label"])(state)
            } else {
                pick(&["show"])(state)
            }
        });

        store.set_state(obj(json!({ "show": false })));

        assert_eq!(view.get("show"), Some(Value::from(false)));
        assert_eq!(view.get("label"), Some(Value::from("x")));
    }

    #[test]
    fn projection_runs_once_per_cycle() {
        let store = Store::default();
        let view = Arc::new(Instance::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let _connection = connect(view, &store, move |_: &Object| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Object::new()
        });
        store.set_state(Object::new());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[should_panic(expected = "bad projection")]
    fn projection_panic_propagates_from_connect() {
        let store = Store::default();
        let view = Arc::new(Instance::new());
        connect(view, &store, |_: &Object| -> Object { panic!("bad projection") });
    }

    #[test]
    fn projection_panic_propagates_from_set_state() {
        let store = Store::from_json(json!({ "count": 1 })).unwrap();
        let view = Arc::new(Instance::new());
        let _connection = connect(view.clone(), &store, |state: &Object| {
            if state["count"] == Value::from(2) {
                panic!("bad projection");
            }
            pick(&["count"])(state)
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.set_state(obj(json!({ "count": 2 })));
        }));
        assert!(result.is_err());
        assert_eq!(view.get("count"), Some(Value::from(1)));

        store.set_state(obj(json!({ "count": 3 })));
        assert_eq!(view.get("count"), Some(Value::from(3)));
        assert_eq!(store.get_state()["count"], Value::from(3));
    }

    #[test]
    fn projection_may_read_through_store_handle() {
        let store = Store::from_json(json!({ "count": 1 })).unwrap();
        let view = Arc::new(Instance::new());
        let handle = store.clone();
        let connection = connect(view.clone(), &store, move |_: &Object| {
            let count = handle.get_state()["count"].clone();
            [("count".to_string(), count)].into()
        });

        store.set_state(obj(json!({ "count": 4 })));

        assert_eq!(view.get("count"), Some(Value::from(4)));
        connection.disconnect();
    }

    #[test]
    fn dropped_store_disconnects_manual_updates() {
        let store = Store::default();
        let view = Arc::new(Instance::new());
        let connection = connect(view, &store, |_: &Object| Object::new());
        drop(store);

        assert_eq!(connection.update(), Err(Error::Disconnected));
    }
}
