//! Invocation context for one pipeline run.
//!
//! One [`InvocationContext`] is created per dispatched event and wrapped in
//! an `Arc` that is shared by every stage of that invocation: guards,
//! middleware, pipes, extractors, and the handler. The state map lets
//! middleware and pipes hand values forward (the transform pipe stashes the
//! filled DTO here for the `Payload<T>` extractor). State is never shared
//! across invocations.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use accord_core::BoxedEvent;

use crate::client::BoxedClient;
use crate::tree::CommandNode;

/// The context object passed to every stage of one invocation.
pub struct InvocationContext {
    event: BoxedEvent,
    client: Option<BoxedClient>,
    node: Option<Arc<CommandNode>>,
    state: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl InvocationContext {
    pub(crate) fn new(
        event: BoxedEvent,
        client: Option<BoxedClient>,
        node: Option<Arc<CommandNode>>,
    ) -> Self {
        Self {
            event,
            client,
            node,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the event being dispatched.
    pub fn event(&self) -> &BoxedEvent {
        &self.event
    }

    /// Returns the bound client handle, if one was bound at resolution.
    pub fn client(&self) -> Option<&BoxedClient> {
        self.client.as_ref()
    }

    /// Returns a clone of the bound client handle.
    pub fn client_arc(&self) -> Option<BoxedClient> {
        self.client.clone()
    }

    /// Returns the matched command node, if this invocation targets one.
    ///
    /// `None` for plain event-listener invocations.
    pub fn node(&self) -> Option<&Arc<CommandNode>> {
        self.node.as_ref()
    }

    /// Stores a value in this invocation's state map.
    ///
    /// Only one value per type can be stored; subsequent calls overwrite.
    pub fn set_state<T: Send + Sync + 'static>(&self, value: T) {
        self.state.lock().insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a cloned value from the state map.
    pub fn get_state<T: Clone + 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Returns `true` if a value of type `T` exists in the state map.
    pub fn has_state<T: 'static>(&self) -> bool {
        self.state.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns a value from the state map.
    pub fn take_state<T: 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("event", &self.event.event_name())
            .field("node", &self.node.as_ref().map(|n| n.name().to_string()))
            .finish_non_exhaustive()
    }
}
