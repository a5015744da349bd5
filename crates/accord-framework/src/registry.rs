//! Append-only registration tables written by resolvers.
//!
//! One [`Registry`] exists per orchestrator run. Resolvers write disjoint
//! tables (tree, listener list, per-handler guard/pipe tables, global lists,
//! client slot), so manifests can be scanned concurrently without
//! coordination beyond the individual locks. When the scan finishes the
//! registry is frozen into a [`Router`](crate::router::Router); nothing
//! mutates these tables afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use parking_lot::{Mutex, RwLock};

use accord_core::{MetadataRegistry, RegistryError};

use crate::client::BoxedClient;
use crate::filter::ExceptionFilter;
use crate::guard::Guard;
use crate::handler::{BoxedHandler, HandlerKey};
use crate::middleware::Middleware;
use crate::pipe::PipeTransform;
use crate::tree::CommandTree;

/// One registered event listener.
///
/// Re-registration appends a new entry rather than replacing: the same
/// handler registered twice fires twice.
pub(crate) struct ListenerEntry {
    pub event_name: String,
    pub key: HandlerKey,
    pub handler: BoxedHandler,
    pub once: bool,
    /// Set on first delivery for once-listeners.
    pub fired: AtomicBool,
}

/// The registration tables shared by all resolvers during one startup scan.
pub(crate) struct Registry {
    pub tree: CommandTree,
    pub listeners: RwLock<Vec<ListenerEntry>>,
    pub guard_table: RwLock<HashMap<HandlerKey, Vec<Arc<dyn Guard>>>>,
    pub pipe_table: RwLock<HashMap<HandlerKey, Vec<Arc<dyn PipeTransform>>>>,
    pub global_guards: RwLock<Vec<Arc<dyn Guard>>>,
    pub global_middleware: RwLock<Vec<Arc<dyn Middleware>>>,
    pub global_pipes: RwLock<Vec<Arc<dyn PipeTransform>>>,
    pub filters: RwLock<Vec<Arc<dyn ExceptionFilter>>>,
    client: Mutex<Option<BoxedClient>>,
    metadata: Arc<MetadataRegistry>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tree: CommandTree::new(),
            listeners: RwLock::new(Vec::new()),
            guard_table: RwLock::new(HashMap::new()),
            pipe_table: RwLock::new(HashMap::new()),
            global_guards: RwLock::new(Vec::new()),
            global_middleware: RwLock::new(Vec::new()),
            global_pipes: RwLock::new(Vec::new()),
            filters: RwLock::new(Vec::new()),
            client: Mutex::new(None),
            metadata: Arc::new(MetadataRegistry::new()),
        }
    }

    /// Binds the single application-wide client handle.
    pub fn bind_client(&self, client: BoxedClient) -> Result<(), RegistryError> {
        let mut slot = self.client.lock();
        if let Some(existing) = slot.as_ref() {
            return Err(RegistryError::ClientAlreadyBound {
                existing: existing.id().to_string(),
                requested: client.id().to_string(),
            });
        }
        *slot = Some(client);
        Ok(())
    }

    pub fn client(&self) -> Option<BoxedClient> {
        self.client.lock().clone()
    }

    pub fn metadata(&self) -> Arc<MetadataRegistry> {
        Arc::clone(&self.metadata)
    }

    pub fn add_listener(&self, event_name: &str, key: HandlerKey, handler: BoxedHandler, once: bool) {
        self.listeners.write().push(ListenerEntry {
            event_name: event_name.to_string(),
            key,
            handler,
            once,
            fired: AtomicBool::new(false),
        });
    }

    pub fn add_handler_guards(&self, key: &HandlerKey, guards: &[Arc<dyn Guard>]) {
        self.guard_table
            .write()
            .entry(key.clone())
            .or_default()
            .extend(guards.iter().cloned());
    }

    pub fn add_handler_pipes(&self, key: &HandlerKey, pipes: &[Arc<dyn PipeTransform>]) {
        self.pipe_table
            .write()
            .entry(key.clone())
            .or_default()
            .extend(pipes.iter().cloned());
    }

    pub fn push_handler_pipe(&self, key: &HandlerKey, pipe: Arc<dyn PipeTransform>) {
        self.pipe_table
            .write()
            .entry(key.clone())
            .or_default()
            .push(pipe);
    }
}
