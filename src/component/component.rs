use crate::value::{Object, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

/// Teardown callback run when a component is destroyed.
pub type DestroyHandler = Box<dyn FnOnce() + Send>;

/// A bindable UI component.
///
/// Implementors own their props; the binding layer only reads them and
/// pushes partial updates.
pub trait Component: Send + Sync {
    /// The full current props.
    fn props(&self) -> Object;

    /// Shallow-merge `partial` into the props and re-render.
    fn set(&self, partial: Object);

    /// Register a callback to run exactly once when the component is destroyed.
    fn on_destroy(&self, handler: DestroyHandler);

    /// A single prop.
    fn get(&self, key: &str) -> Option<Value> {
        self.props().get(key).cloned()
    }
}

/// A headless component that keeps props in memory and counts renders.
///
/// Like a compiled template component, it only commits a `set` when some key
/// is dirty. Array and object values always count as dirty since their
/// contents may have been replaced.
///
/// # Examples
///
/// ```
/// use zerostore::{Component, Instance, Value};
///
/// let instance = Instance::new();
/// instance.set([("title".to_string(), Value::from("hi"))].into());
/// instance.set([("title".to_string(), Value::from("hi"))].into());
///
/// assert_eq!(instance.get("title"), Some(Value::from("hi")));
/// assert_eq!(instance.renders(), 1);
/// ```
#[derive(Default)]
pub struct Instance {
    props: RwLock<Object>,
    renders: AtomicUsize,
    teardown: Mutex<Vec<DestroyHandler>>,
    destroyed: AtomicBool,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance with initial props. Does not count as a render.
    pub fn with_props(props: Object) -> Self {
        Self {
            props: RwLock::new(props),
            ..Self::default()
        }
    }

    /// How many times `set` committed new props.
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Destroy the instance, running every teardown handler once.
    ///
    /// Later calls do nothing.
    pub fn destroy(&self) {
        let handlers = {
            let mut teardown = self.teardown.lock().unwrap_or_else(PoisonError::into_inner);
            if self.destroyed.swap(true, Ordering::SeqCst) {
                return;
            }
            std::mem::take(&mut *teardown)
        };
        tracing::debug!(handlers = handlers.len(), "destroying component");
        for handler in handlers {
            handler();
        }
    }
}

impl Component for Instance {
    fn props(&self) -> Object {
        self.props
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, partial: Object) {
        let mut props = self.props.write().unwrap_or_else(PoisonError::into_inner);
        let dirty = partial.iter().any(|(key, value)| {
            value.is_compound() || props.get(key).map_or(true, |old| !old.same(value))
        });
        if !dirty {
            return;
        }
        props.extend(partial);
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn on_destroy(&self, handler: DestroyHandler) {
        let mut teardown = self.teardown.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_destroyed() {
            drop(teardown);
            // Too late to wait for teardown.
            handler();
            return;
        }
        teardown.push(handler);
    }
}
