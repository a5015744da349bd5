//! Runtime dispatch: the invocation pipeline.
//!
//! The [`Router`] is the frozen, read-only product of startup resolution.
//! Per incoming event it:
//!
//! 1. Delivers registered `on`/`once` listeners for the event name.
//! 2. For interactions, resolves the command tree node; an unmatched path is
//!    silently ignored; the event may belong to another integration.
//! 3. Runs guards in registration order (global first); the first `false`
//!    aborts the invocation with no handler call and no error.
//! 4. Runs middleware in order.
//! 5. Runs pipes in order, threading the transformed value forward; the
//!    built-in transform pipe produces the populated DTO.
//! 6. Invokes the handler with extracted parameters. Errors thrown by the
//!    handler or by a pipe are offered to the exception filters; an
//!    unmatched error propagates as [`DispatchError::Unhandled`].
//!
//! All tables are immutable here, so concurrent in-flight dispatches share
//! the router without locking. Each invocation owns its context and DTO.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use serde_json::Value;
use tracing::{Level, debug, span, trace};

use accord_core::{BoxedEvent, MetadataRegistry, RegistryError};

use crate::client::BoxedClient;
use crate::context::InvocationContext;
use crate::error::{DispatchError, HandlerError};
use crate::filter::ExceptionFilter;
use crate::guard::Guard;
use crate::handler::{BoxedHandler, HandlerKey};
use crate::middleware::Middleware;
use crate::pipe::PipeTransform;
use crate::registry::{ListenerEntry, Registry};
use crate::tree::CommandTree;

/// How one dispatch concluded. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// At least one handler or listener ran (or a filter handled its error).
    Handled,
    /// A guard returned `false`; the matched handler was never invoked.
    GuardRejected,
    /// Nothing was registered for this event.
    NoMatch,
}

enum PipelineOutcome {
    Completed,
    GuardRejected,
}

/// The frozen routing tables, ready for runtime dispatch.
pub struct Router {
    tree: CommandTree,
    listeners: Vec<ListenerEntry>,
    guard_table: HashMap<HandlerKey, Vec<Arc<dyn Guard>>>,
    pipe_table: HashMap<HandlerKey, Vec<Arc<dyn PipeTransform>>>,
    global_guards: Vec<Arc<dyn Guard>>,
    global_middleware: Vec<Arc<dyn Middleware>>,
    global_pipes: Vec<Arc<dyn PipeTransform>>,
    filters: Vec<Arc<dyn ExceptionFilter>>,
    client: Option<BoxedClient>,
    metadata: Arc<MetadataRegistry>,
}

impl Router {
    pub(crate) fn from_registry(registry: Registry) -> Result<Self, RegistryError> {
        registry.tree.validate()?;
        let client = registry.client();
        let metadata = registry.metadata();
        Ok(Self {
            tree: registry.tree,
            listeners: registry.listeners.into_inner(),
            guard_table: registry.guard_table.into_inner(),
            pipe_table: registry.pipe_table.into_inner(),
            global_guards: registry.global_guards.into_inner(),
            global_middleware: registry.global_middleware.into_inner(),
            global_pipes: registry.global_pipes.into_inner(),
            filters: registry.filters.into_inner(),
            client,
            metadata,
        })
    }

    /// Returns the command tree.
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Returns the metadata side-table.
    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    /// Returns the bound client handle, if any.
    pub fn client(&self) -> Option<&BoxedClient> {
        self.client.as_ref()
    }

    /// Returns the number of registered event listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Exports the command tree as a platform-registration payload.
    pub fn export_commands(&self) -> Value {
        self.tree.export(&self.metadata)
    }

    /// Dispatches one incoming event through listeners and the command
    /// pipeline.
    pub async fn dispatch(&self, event: BoxedEvent) -> Result<DispatchOutcome, DispatchError> {
        let dispatch_span = span!(Level::DEBUG, "dispatch", event = event.event_name());
        let _enter = dispatch_span.enter();

        let mut handled = false;

        for entry in &self.listeners {
            if entry.event_name != event.event_name() {
                continue;
            }
            if entry.once && entry.fired.swap(true, Ordering::SeqCst) {
                trace!(handler = %entry.key, "Once-listener already fired, skipping");
                continue;
            }
            let ctx = Arc::new(InvocationContext::new(
                event.clone(),
                self.client.clone(),
                None,
            ));
            if let PipelineOutcome::Completed = self
                .run_pipeline(&entry.key, &entry.handler, ctx)
                .await?
            {
                handled = true;
            }
        }

        if let Some(interaction) = event.as_interaction() {
            let path = interaction.command_path();
            let segments = path.segments();
            let node = self.tree.resolve(&segments);
            let Some(leaf) = node.as_ref().and_then(|n| n.leaf()) else {
                debug!(path = %segments.join(" "), "No command node matched, ignoring");
                return Ok(if handled {
                    DispatchOutcome::Handled
                } else {
                    DispatchOutcome::NoMatch
                });
            };

            let ctx = Arc::new(InvocationContext::new(
                event.clone(),
                self.client.clone(),
                node.clone(),
            ));
            return match self.run_pipeline(&leaf.key, &leaf.handler, ctx).await? {
                PipelineOutcome::Completed => Ok(DispatchOutcome::Handled),
                PipelineOutcome::GuardRejected => Ok(DispatchOutcome::GuardRejected),
            };
        }

        Ok(if handled {
            DispatchOutcome::Handled
        } else {
            DispatchOutcome::NoMatch
        })
    }

    /// Runs the staged pipeline for one handler invocation.
    async fn run_pipeline(
        &self,
        key: &HandlerKey,
        handler: &BoxedHandler,
        ctx: Arc<InvocationContext>,
    ) -> Result<PipelineOutcome, DispatchError> {
        let method_guards = self.guard_table.get(key).into_iter().flatten();
        for guard in self.global_guards.iter().chain(method_guards) {
            match guard.can_activate(&ctx).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(handler = %key, "Guard rejected invocation");
                    return Ok(PipelineOutcome::GuardRejected);
                }
                Err(source) => return Err(DispatchError::Guard { source }),
            }
        }

        for middleware in &self.global_middleware {
            middleware
                .handle(&ctx)
                .await
                .map_err(|source| DispatchError::Middleware { source })?;
        }

        let mut value: Option<Value> = None;
        let method_pipes = self.pipe_table.get(key).into_iter().flatten();
        for pipe in self.global_pipes.iter().chain(method_pipes) {
            value = match pipe.transform(&ctx, value).await {
                Ok(value) => value,
                Err(error) => {
                    self.offer_to_filters(error, &ctx).await?;
                    return Ok(PipelineOutcome::Completed);
                }
            };
        }

        match (handler)(Arc::clone(&ctx)).await {
            Ok(()) => Ok(PipelineOutcome::Completed),
            Err(error) => {
                self.offer_to_filters(error, &ctx).await?;
                Ok(PipelineOutcome::Completed)
            }
        }
    }

    /// Routes a thrown error to the first matching exception filter.
    ///
    /// Unmatched errors are not swallowed; they surface to the caller.
    async fn offer_to_filters(
        &self,
        error: HandlerError,
        ctx: &InvocationContext,
    ) -> Result<(), DispatchError> {
        for filter in &self.filters {
            if filter.catches(&error) {
                debug!(error = %error, "Exception filter caught handler error");
                filter.catch(&error, ctx).await;
                return Ok(());
            }
        }
        Err(DispatchError::Unhandled { source: error })
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("commands", &self.tree.roots().len())
            .field("listeners", &self.listeners.len())
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    use accord_core::{
        CommandDto, CommandInteraction, DtoSchema, MessageEvent, OptionError, ParamSpec,
    };

    use crate::extractor::Payload;
    use crate::manifest::{Manifest, command, on, once, subcommand};
    use crate::orchestrator::Orchestrator;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct PingDto {
        target: String,
        count: Option<i64>,
    }

    impl CommandDto for PingDto {
        fn schema() -> DtoSchema {
            DtoSchema::new("PingDto")
                .param("target", ParamSpec::new().required(true))
                .param("count", ParamSpec::new())
        }
    }

    #[derive(Debug, Error)]
    #[error("ban rejected")]
    struct BanError;

    struct BanFilter(Arc<AtomicUsize>);

    #[async_trait]
    impl ExceptionFilter for BanFilter {
        fn catches(&self, error: &HandlerError) -> bool {
            crate::filter::error_is::<BanError>(error)
        }

        async fn catch(&self, _error: &HandlerError, _ctx: &InvocationContext) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&c), c)
    }

    #[tokio::test]
    async fn command_dispatch_fills_the_dto() {
        let (calls, observed) = counter();
        let router = Orchestrator::new()
            .manifest(Manifest::new("ping").handler(
                command("ping").dto::<PingDto>().handler(
                    move |Payload(dto): Payload<PingDto>| {
                        let calls = Arc::clone(&calls);
                        async move {
                            assert_eq!(dto.target, "world");
                            assert_eq!(dto.count, None);
                            calls.fetch_add(1, Ordering::SeqCst);
                        }
                    },
                ),
            ))
            .resolve()
            .await
            .unwrap();

        let outcome = router
            .dispatch(Arc::new(
                CommandInteraction::new("ping").with_option("target", "world"),
            ))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn subcommand_paths_route_to_their_leaf() {
        let (calls, observed) = counter();
        let router = Orchestrator::new()
            .manifest(Manifest::new("mod").handler(
                subcommand("mod", Some("user"), "ban").handler(move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                    }
                }),
            ))
            .resolve()
            .await
            .unwrap();

        let outcome = router
            .dispatch(Arc::new(
                CommandInteraction::new("mod").group("user").subcommand("ban"),
            ))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn guard_rejection_is_silent() {
        let (calls, observed) = counter();
        let router = Orchestrator::new()
            .manifest(Manifest::new("secret").handler(
                command("secret")
                    .guard(|_: &InvocationContext| false)
                    .handler(move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                        }
                    }),
            ))
            .resolve()
            .await
            .unwrap();

        let outcome = router
            .dispatch(Arc::new(CommandInteraction::new("secret")))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::GuardRejected);
        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn global_and_method_guards_compose() {
        use accord_core::{AccessConfig, AccessEvaluator};

        use crate::guard::AccessGuard;

        let (calls, observed) = counter();
        let evaluator = AccessEvaluator::new(AccessConfig {
            deny_guilds: vec!["G2".into()],
            ..AccessConfig::default()
        });
        let router = Orchestrator::new()
            .manifest(
                Manifest::new("ping")
                    .guard(AccessGuard::new(evaluator))
                    .handler(
                        command("ping")
                            .guard(|ctx: &InvocationContext| {
                                ctx.event().channel_id() != Some("C-muted")
                            })
                            .handler(move || {
                                let calls = Arc::clone(&calls);
                                async move {
                                    calls.fetch_add(1, Ordering::SeqCst);
                                }
                            }),
                    ),
            )
            .resolve()
            .await
            .unwrap();

        let plain = router
            .dispatch(Arc::new(CommandInteraction::new("ping")))
            .await
            .unwrap();
        assert_eq!(plain, DispatchOutcome::Handled);

        // Global access guard rejects before the method guard runs.
        let denied_guild = router
            .dispatch(Arc::new(CommandInteraction::new("ping").guild("G2")))
            .await
            .unwrap();
        assert_eq!(denied_guild, DispatchOutcome::GuardRejected);

        // Method guard rejects after the global guard passes.
        let muted = router
            .dispatch(Arc::new(CommandInteraction::new("ping").channel("C-muted")))
            .await
            .unwrap();
        assert_eq!(muted, DispatchOutcome::GuardRejected);

        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn once_listeners_fire_a_single_time() {
        let (on_calls, on_observed) = counter();
        let (once_calls, once_observed) = counter();
        let router = Orchestrator::new()
            .manifest(
                Manifest::new("listeners")
                    .handler(on("message_create").handler(move || {
                        let c = Arc::clone(&on_calls);
                        async move {
                            c.fetch_add(1, Ordering::SeqCst);
                        }
                    }))
                    .handler(once("message_create").handler(move || {
                        let c = Arc::clone(&once_calls);
                        async move {
                            c.fetch_add(1, Ordering::SeqCst);
                        }
                    })),
            )
            .resolve()
            .await
            .unwrap();

        for _ in 0..3 {
            let outcome = router
                .dispatch(Arc::new(MessageEvent::new("hi")))
                .await
                .unwrap();
            assert_eq!(outcome, DispatchOutcome::Handled);
        }
        assert_eq!(on_observed.load(Ordering::SeqCst), 3);
        assert_eq!(once_observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn double_registration_fires_twice_per_event() {
        let (calls, observed) = counter();
        let make = |calls: Arc<AtomicUsize>| {
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                }
            }
        };
        // Same function registered twice; append-only semantics, no dedup.
        let router = Orchestrator::new()
            .manifest(
                Manifest::new("listeners")
                    .handler(on("message_create").handler(make(Arc::clone(&calls))))
                    .handler(on("message_create").handler(make(calls))),
            )
            .resolve()
            .await
            .unwrap();

        router
            .dispatch(Arc::new(MessageEvent::new("hi")))
            .await
            .unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unmatched_paths_are_ignored() {
        let router = Orchestrator::new()
            .manifest(
                Manifest::new("ping").handler(command("ping").handler(|| async {})),
            )
            .resolve()
            .await
            .unwrap();

        let outcome = router
            .dispatch(Arc::new(CommandInteraction::new("pong")))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::NoMatch);
    }

    #[tokio::test]
    async fn filters_catch_matching_handler_errors() {
        let (caught, observed) = counter();
        let router = Orchestrator::new()
            .manifest(
                Manifest::new("mod")
                    .filter(BanFilter(caught))
                    .handler(command("ban").handler(|| async { Err::<(), _>(BanError) })),
            )
            .resolve()
            .await
            .unwrap();

        let outcome = router
            .dispatch(Arc::new(CommandInteraction::new("ban")))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn uncaught_handler_errors_propagate() {
        let router = Orchestrator::new()
            .manifest(
                Manifest::new("mod")
                    .handler(command("ban").handler(|| async { Err::<(), _>(BanError) })),
            )
            .resolve()
            .await
            .unwrap();

        let error = router
            .dispatch(Arc::new(CommandInteraction::new("ban")))
            .await
            .unwrap_err();
        match error {
            DispatchError::Unhandled { source } => {
                assert!(source.downcast_ref::<BanError>().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_required_option_is_a_pipe_error() {
        let (calls, observed) = counter();
        let router = Orchestrator::new()
            .manifest(Manifest::new("ping").handler(
                command("ping").dto::<PingDto>().handler(
                    move |Payload(_): Payload<PingDto>| {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                        }
                    },
                ),
            ))
            .resolve()
            .await
            .unwrap();

        let error = router
            .dispatch(Arc::new(CommandInteraction::new("ping")))
            .await
            .unwrap_err();
        match error {
            DispatchError::Unhandled { source } => {
                assert!(source.downcast_ref::<OptionError>().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn export_nests_subcommands_with_options() {
        let router = Orchestrator::new()
            .manifest(
                Manifest::new("app")
                    .handler(command("ping").dto::<PingDto>().handler(
                        |Payload(_): Payload<PingDto>| async {},
                    ))
                    .handler(subcommand("mod", None, "ban").handler(|| async {})),
            )
            .resolve()
            .await
            .unwrap();

        let export = router.export_commands();
        let commands = export.as_array().unwrap();
        assert_eq!(commands.len(), 2);

        let ping = commands
            .iter()
            .find(|c| c["name"] == "ping")
            .expect("ping exported");
        let options = ping["options"].as_array().unwrap();
        assert!(options.iter().any(|o| o["name"] == "target"
            && o["required"] == serde_json::json!(true)));
    }
}
