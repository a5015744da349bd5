//! Declarative registration manifests.
//!
//! Where an annotation-driven platform would discover handlers through
//! decorators and a DI container, Accord modules declare their registrations
//! explicitly: each handler-owning module builds a [`Manifest`] with a
//! fluent builder, and the orchestrator scans the composed manifests at
//! startup. A manifest carries the class-level registrations (client
//! binding, middleware, global guards/pipes, exception filters) and one
//! [`HandlerSpec`] per handler method.
//!
//! # Example
//!
//! ```rust,ignore
//! use accord_framework::manifest::{command, on, Manifest};
//!
//! fn ping_module() -> Manifest {
//!     Manifest::new("ping")
//!         .filter(NotFoundFilter)
//!         .handler(
//!             command("ping")
//!                 .dto::<PingDto>()
//!                 .handler(|payload: Payload<PingDto>| async move {
//!                     format!("pong, {}", payload.target)
//!                 }),
//!         )
//!         .handler(on("message_create").handler(log_message))
//! }
//! ```

use std::any::TypeId;
use std::sync::Arc;

use accord_core::{CommandDto, CommandPath, DtoSchema, DtoTemplate, RegistryError};

use crate::client::BoxedClient;
use crate::filter::ExceptionFilter;
use crate::guard::Guard;
use crate::handler::{BoxedHandler, RouteHandler, into_handler};
use crate::middleware::Middleware;
use crate::pipe::PipeTransform;

// ============================================================================
// DTO declaration
// ============================================================================

/// A handler's declared DTO type, captured without instantiating it.
///
/// The template itself is built during resolution so that a malformed DTO
/// (one that does not serialize to an object) surfaces as a fatal startup
/// error rather than a panic at declaration time.
pub struct DtoDeclaration {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) schema: DtoSchema,
    template_fn: fn() -> Result<DtoTemplate, RegistryError>,
}

impl DtoDeclaration {
    fn of<T: CommandDto>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            schema: T::schema(),
            template_fn: DtoTemplate::of::<T>,
        }
    }

    /// Builds the DTO template for this declaration.
    pub(crate) fn template(&self) -> Result<DtoTemplate, RegistryError> {
        (self.template_fn)()
    }
}

// ============================================================================
// Handler specs
// ============================================================================

/// What a handler is bound to: a command path or a named platform event.
pub enum Binding {
    /// A command tree leaf.
    Command(CommandPath),
    /// A repeating listener on a platform event name.
    On(String),
    /// A listener fired at most once.
    Once(String),
}

/// One declared handler with its method-level registrations.
pub struct HandlerSpec {
    pub(crate) name: String,
    pub(crate) binding: Binding,
    pub(crate) guards: Vec<Arc<dyn Guard>>,
    pub(crate) pipes: Vec<Arc<dyn PipeTransform>>,
    pub(crate) dto: Option<DtoDeclaration>,
    pub(crate) handler: BoxedHandler,
}

/// Builder for a [`HandlerSpec`]; finished by [`handler`](Self::handler).
pub struct HandlerDraft {
    name: String,
    binding: Binding,
    guards: Vec<Arc<dyn Guard>>,
    pipes: Vec<Arc<dyn PipeTransform>>,
    dto: Option<DtoDeclaration>,
}

impl HandlerDraft {
    fn new(name: String, binding: Binding) -> Self {
        Self {
            name,
            binding,
            guards: Vec::new(),
            pipes: Vec::new(),
            dto: None,
        }
    }

    /// Declares the DTO type filled from interaction options.
    pub fn dto<T: CommandDto>(mut self) -> Self {
        self.dto = Some(DtoDeclaration::of::<T>());
        self
    }

    /// Adds a method-level guard.
    pub fn guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Adds a method-level pipe.
    pub fn pipe(mut self, pipe: impl PipeTransform + 'static) -> Self {
        self.pipes.push(Arc::new(pipe));
        self
    }

    /// Binds the handler function, finishing the spec.
    pub fn handler<F, T>(self, f: F) -> HandlerSpec
    where
        F: RouteHandler<T> + Send + Sync + 'static,
        T: 'static,
    {
        HandlerSpec {
            name: self.name,
            binding: self.binding,
            guards: self.guards,
            pipes: self.pipes,
            dto: self.dto,
            handler: into_handler(f),
        }
    }
}

/// Starts a handler spec bound to a top-level command.
pub fn command(name: impl Into<String>) -> HandlerDraft {
    let name = name.into();
    HandlerDraft::new(name.clone(), Binding::Command(CommandPath::command(name)))
}

/// Starts a handler spec bound to a sub-command, optionally inside a group.
pub fn subcommand(
    command: impl Into<String>,
    group: Option<&str>,
    name: impl Into<String>,
) -> HandlerDraft {
    let path = CommandPath::subcommand(command, group.map(str::to_string), name);
    HandlerDraft::new(path.segments().join(" "), Binding::Command(path))
}

/// Starts a handler spec listening on a platform event name.
pub fn on(event_name: impl Into<String>) -> HandlerDraft {
    let event_name = event_name.into();
    HandlerDraft::new(format!("on {event_name}"), Binding::On(event_name))
}

/// Starts a handler spec listening on a platform event name, fired at most
/// once.
pub fn once(event_name: impl Into<String>) -> HandlerDraft {
    let event_name = event_name.into();
    HandlerDraft::new(format!("once {event_name}"), Binding::Once(event_name))
}

// ============================================================================
// Manifests
// ============================================================================

/// The declarative registration unit scanned by the orchestrator.
pub struct Manifest {
    pub(crate) name: String,
    pub(crate) client: Option<BoxedClient>,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) guards: Vec<Arc<dyn Guard>>,
    pub(crate) pipes: Vec<Arc<dyn PipeTransform>>,
    pub(crate) filters: Vec<Arc<dyn ExceptionFilter>>,
    pub(crate) handlers: Vec<HandlerSpec>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client: None,
            middleware: Vec::new(),
            guards: Vec::new(),
            pipes: Vec::new(),
            filters: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Returns the manifest name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds the platform client handle.
    ///
    /// At most one manifest across the whole application may bind a client;
    /// a second binding is a fatal startup error.
    pub fn client(mut self, client: BoxedClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Registers middleware run for every invocation.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Registers a guard run for every invocation, before method guards.
    pub fn guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Registers a pipe run for every invocation, before method pipes.
    pub fn pipe(mut self, pipe: impl PipeTransform + 'static) -> Self {
        self.pipes.push(Arc::new(pipe));
        self
    }

    /// Registers an exception filter.
    pub fn filter(mut self, filter: impl ExceptionFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Adds a handler spec.
    pub fn handler(mut self, spec: HandlerSpec) -> Self {
        self.handlers.push(spec);
        self
    }
}

impl std::fmt::Debug for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manifest")
            .field("name", &self.name)
            .field("handlers", &self.handlers.len())
            .field("has_client", &self.client.is_some())
            .finish()
    }
}

/// A handler-owning module exposing its registrations to the orchestrator.
///
/// This is the discovery function replacing container enumeration: the
/// application composes its modules into one list and hands them to the
/// [`Orchestrator`](crate::orchestrator::Orchestrator).
pub trait Module: Send + Sync {
    /// Builds this module's manifest.
    fn manifest(&self) -> Manifest;
}
