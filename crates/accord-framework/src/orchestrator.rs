//! Startup resolution orchestration.
//!
//! The [`Orchestrator`] is the startup state machine: it collects the
//! manifests of every registered module, scans them all concurrently, and
//! freezes the resulting registration tables into a [`Router`]. Within one
//! manifest resolution is sequential: class resolvers first, then the method
//! resolvers for each handler in documented order.
//!
//! Resolution runs exactly once. Any resolver error aborts the whole
//! startup; there is no partial-readiness state.
//!
//! # Example
//!
//! ```rust,ignore
//! let router = Orchestrator::new()
//!     .module(&PingModule)
//!     .module(&ModerationModule)
//!     .resolve()
//!     .await?;
//! ```

use futures::future::try_join_all;
use tracing::{Level, debug, info, span};

use accord_core::RegistryError;

use crate::handler::HandlerKey;
use crate::manifest::{Manifest, Module};
use crate::registry::Registry;
use crate::resolver::{class_resolvers, method_resolvers};
use crate::router::Router;

/// Collects manifests and runs the startup resolution scan.
#[derive(Default)]
pub struct Orchestrator {
    manifests: Vec<Manifest>,
}

impl Orchestrator {
    /// Creates an orchestrator with no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module's manifest.
    pub fn module<M: Module>(self, module: &M) -> Self {
        self.manifest(module.manifest())
    }

    /// Registers a manifest directly.
    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.manifests.push(manifest);
        self
    }

    /// Runs the resolution scan and freezes the registrations into a router.
    ///
    /// # Errors
    ///
    /// Any [`RegistryError`] raised by a resolver (duplicate commands,
    /// schema/property mismatches, double client binding) or by the final
    /// tree invariant check aborts the startup.
    pub async fn resolve(self) -> Result<Router, RegistryError> {
        let registry = Registry::new();
        let class = class_resolvers();
        let method = method_resolvers();

        info!(manifests = self.manifests.len(), "Resolving registrations");

        try_join_all(self.manifests.iter().map(|manifest| {
            let registry = &registry;
            let class = &class;
            let method = &method;
            async move {
                let span = span!(Level::DEBUG, "resolve", manifest = manifest.name());
                let _enter = span.enter();

                // Filters carry no per-handler state; register them ahead of
                // the class pass.
                registry
                    .filters
                    .write()
                    .extend(manifest.filters.iter().cloned());

                for resolver in class {
                    debug!(resolver = resolver.name(), "Running class resolver");
                    resolver.resolve(manifest, registry)?;
                }
                for (index, handler) in manifest.handlers.iter().enumerate() {
                    let key = HandlerKey::of(manifest.name(), index, &handler.name);
                    for resolver in method {
                        resolver.resolve(handler, &key, registry)?;
                    }
                }
                Ok::<(), RegistryError>(())
            }
        }))
        .await?;

        let router = Router::from_registry(registry)?;
        info!(
            commands = router.tree().roots().len(),
            listeners = router.listener_count(),
            "Resolution complete"
        );
        Ok(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BoxedClient, Client, ClientResult};
    use crate::manifest::command;
    use std::any::Any;
    use std::sync::Arc;

    struct NullClient(&'static str);

    #[async_trait::async_trait]
    impl Client for NullClient {
        fn id(&self) -> &str {
            self.0
        }

        async fn send(&self, _channel_id: &str, _content: &str) -> ClientResult<()> {
            Ok(())
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn null_client(id: &'static str) -> BoxedClient {
        Arc::new(NullClient(id))
    }

    #[tokio::test]
    async fn duplicate_sibling_commands_abort_startup() {
        let result = Orchestrator::new()
            .manifest(Manifest::new("a").handler(command("ping").handler(|| async {})))
            .manifest(Manifest::new("b").handler(command("ping").handler(|| async {})))
            .resolve()
            .await;
        assert!(matches!(
            result.unwrap_err(),
            RegistryError::DuplicateCommand { .. }
        ));
    }

    #[tokio::test]
    async fn double_client_binding_aborts_startup() {
        let result = Orchestrator::new()
            .manifest(Manifest::new("a").client(null_client("one")))
            .manifest(Manifest::new("b").client(null_client("two")))
            .resolve()
            .await;
        assert!(matches!(
            result.unwrap_err(),
            RegistryError::ClientAlreadyBound { .. }
        ));
    }

    #[tokio::test]
    async fn empty_resolution_yields_an_empty_router() {
        let router = Orchestrator::new().resolve().await.unwrap();
        assert!(router.tree().roots().is_empty());
        assert_eq!(router.listener_count(), 0);
    }
}
