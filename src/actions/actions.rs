use crate::error::{Error, Result};
use crate::store::Store;
use crate::value::{Object, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A pure state transition: current state and call arguments to a partial
/// state that is merged back into the store.
pub type Reducer = Arc<dyn Fn(&Object, &[Value]) -> Object + Send + Sync>;

/// A set of reducers keyed by action name.
#[derive(Clone, Default)]
pub struct Actions {
    reducers: BTreeMap<String, Reducer>,
}

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reducer under `name`, replacing any previous one.
    pub fn with<F>(mut self, name: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Object + Send + Sync + 'static,
    {
        self.reducers.insert(name.into(), Arc::new(reducer));
        self
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

/// A reducer bound to a store.
#[derive(Clone)]
pub struct BoundAction {
    name: String,
    reducer: Reducer,
    store: Store,
}

impl BoundAction {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the reducer to the current state and merge its result.
    pub fn call(&self, args: &[Value]) {
        tracing::trace!(action = %self.name, args = args.len(), "dispatching action");
        self.store.update(|state| (self.reducer)(state, args));
    }
}

/// Actions bound to one store.
#[derive(Clone, Default)]
pub struct BoundActions {
    actions: BTreeMap<String, BoundAction>,
}

impl BoundActions {
    pub fn get(&self, name: &str) -> Option<&BoundAction> {
        self.actions.get(name)
    }

    /// Call the action bound under `name`.
    pub fn dispatch(&self, name: &str, args: &[Value]) -> Result<()> {
        let action = self
            .get(name)
            .ok_or_else(|| Error::UnknownAction(name.to_string()))?;
        action.call(args);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

/// Bind every reducer in `actions` to `store`.
pub fn bind_actions(actions: Actions, store: &Store) -> BoundActions {
    let actions = actions
        .reducers
        .into_iter()
        .map(|(name, reducer)| {
            let action = BoundAction {
                name: name.clone(),
                reducer,
                store: store.clone(),
            };
            (name, action)
        })
        .collect();
    BoundActions { actions }
}

/// Build actions from a factory that can see the store, then bind them.
///
/// # Examples
///
/// ```
/// use zerostore::{get_actions, Actions, Object, Store, Value};
/// use serde_json::json;
///
/// let store = Store::from_json(json!({ "count": 1 })).unwrap();
/// let actions = get_actions(&store, |_store| {
///     Actions::new().with("add", |state: &Object, args: &[Value]| {
///         let count = state["count"].as_i64().unwrap_or(0);
///         let by = args.first().and_then(Value::as_i64).unwrap_or(1);
///         [("count".to_string(), Value::from(count + by))].into()
///     })
/// });
///
/// actions.dispatch("add", &[Value::from(4)]).unwrap();
/// assert_eq!(store.get_state()["count"], Value::from(5));
/// assert!(actions.dispatch("remove", &[]).is_err());
/// ```
pub fn get_actions<F>(store: &Store, factory: F) -> BoundActions
where
    F: FnOnce(&Store) -> Actions,
{
    bind_actions(factory(store), store)
}
