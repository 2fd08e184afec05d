//! Change notifications.

use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Emitted once per successful `apply` or `convert` that produced a new object.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// The root (or conversion source) passed in.
    pub source: Value,
    /// The new root (or converted object).
    pub target: Value,
    /// The value written at the leaf. `None` for conversions.
    pub value: Option<Value>,
    /// Rebuilt properties, root first. Empty for conversions.
    pub affected_properties: Vec<String>,
}

pub type ChangeHandler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Registered change handlers.
#[derive(Default)]
pub struct ChangeSink {
    handlers: RwLock<Vec<ChangeHandler>>,
}

impl ChangeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&ChangeEvent) + Send + Sync + 'static) {
        self.handlers.write().push(Arc::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Run every handler with the event built by `event`. The event is only
    /// built when a handler is registered.
    ///
    /// Handlers run outside the lock, so a handler may subscribe further
    /// handlers; those see the next event.
    pub fn emit(&self, event: impl FnOnce() -> ChangeEvent) {
        let handlers = self.handlers.read().clone();
        if handlers.is_empty() {
            return;
        }
        let event = event();
        for handler in &handlers {
            handler(&event);
        }
    }
}

impl fmt::Debug for ChangeSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSink")
            .field("handlers", &self.len())
            .finish()
    }
}
