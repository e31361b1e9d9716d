use crate::error::Result;
use crate::value::{object_from_json, Object};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    // Ids only grow, so key order is subscription order.
    entries: BTreeMap<u64, Listener>,
}

impl Listeners {
    fn insert(&mut self, listener: Listener) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, listener);
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }
}

// A panicking listener or projection must not brick the store.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// A shared state container with synchronous change notification.
///
/// Cloning a store yields another handle to the same state and listeners.
///
/// # Examples
///
/// ```
/// use zerostore::{Store, Value};
/// use serde_json::json;
///
/// let store = Store::from_json(json!({ "count": 1 })).unwrap();
/// store.update(|state| {
///     let count = state["count"].as_i64().unwrap_or(0);
///     [("count".to_string(), Value::from(count + 1))].into()
/// });
///
/// assert_eq!(store.get_state()["count"], Value::from(2));
/// ```
pub struct Store {
    shared: Arc<Shared>,
}

struct Shared {
    initial: Object,
    state: RwLock<Object>,
    listeners: RwLock<Listeners>,
}

impl Store {
    /// Create a new store with the given initial state.
    pub fn new(initial: Object) -> Self {
        Self {
            shared: Arc::new(Shared {
                initial: initial.clone(),
                state: RwLock::new(initial),
                listeners: RwLock::new(Listeners::default()),
            }),
        }
    }

    /// Create a store from a JSON object document.
    pub fn from_json(initial: serde_json::Value) -> Result<Self> {
        object_from_json(initial).map(Self::new)
    }

    /// Get a snapshot of the current state.
    ///
    /// Nested arrays and objects are shared with the store, not copied.
    pub fn get_state(&self) -> Object {
        read(&self.shared.state).clone()
    }

    /// Read state without cloning it.
    ///
    /// The store is read-locked while `f` runs, so `f` must not write to it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Object) -> R,
    {
        let state = read(&self.shared.state);
        f(&state)
    }

    /// Shallow-merge `partial` into the state and notify every listener.
    ///
    /// Listeners run on the caller's thread before this returns.
    pub fn set_state(&self, partial: Object) {
        {
            let mut state = write(&self.shared.state);
            tracing::trace!(keys = partial.len(), "merging partial state");
            state.extend(partial);
        }
        self.notify();
    }

    /// Compute a partial from the current state and merge it.
    ///
    /// The read and the merge happen under one write lock, so concurrent
    /// updates never lose each other's results. `f` must not touch the store.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&Object) -> Object,
    {
        {
            let mut state = write(&self.shared.state);
            let partial = f(&state);
            tracing::trace!(keys = partial.len(), "merging computed state");
            state.extend(partial);
        }
        self.notify();
    }

    /// Restore the state the store was created with and notify listeners.
    pub fn reset(&self) {
        {
            let mut state = write(&self.shared.state);
            *state = self.shared.initial.clone();
        }
        tracing::debug!("store reset to initial state");
        self.notify();
    }

    /// Subscribe to state changes.
    ///
    /// The callback runs after every write until the returned subscription is
    /// released.
    #[must_use = "dropping the subscription leaves no way to unsubscribe"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = write(&self.shared.listeners).insert(Arc::new(callback));
        tracing::trace!(listener = id, "listener subscribed");
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakStore {
        WeakStore {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        read(&self.shared.listeners).entries.len()
    }

    /// Notify all subscribers of a state change.
    ///
    /// Locks are released while listeners run, so a listener may read, write
    /// or unsubscribe. Listeners removed mid-dispatch are skipped; listeners
    /// added mid-dispatch wait for the next write.
    fn notify(&self) {
        let snapshot: Vec<(u64, Listener)> = read(&self.shared.listeners)
            .entries
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        for (id, listener) in snapshot {
            if read(&self.shared.listeners).contains(id) {
                listener();
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Object::new())
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// A store handle that does not keep the store alive.
#[derive(Clone)]
pub(crate) struct WeakStore {
    shared: Weak<Shared>,
}

impl WeakStore {
    pub(crate) fn upgrade(&self) -> Option<Store> {
        self.shared.upgrade().map(|shared| Store { shared })
    }
}

/// Handle for removing one listener registration.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Remove the listener from its store.
    ///
    /// Returns `true` only for the call that actually removed it.
    pub fn unsubscribe(&self) -> bool {
        let removed = match self.shared.upgrade() {
            Some(shared) => {
                let mut guard = write(&shared.listeners);
                guard.remove(self.id)
            }
            None => false,
        };
        if removed {
            tracing::trace!(listener = self.id, "listener unsubscribed");
        }
        removed
    }
}
