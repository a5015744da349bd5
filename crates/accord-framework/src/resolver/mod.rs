//! Resolvers: one registration concern each.
//!
//! Each resolver inspects one metadata kind on a manifest (class-level) or
//! on a single handler spec (method-level) and, when present, performs its
//! registration side effect against the shared [`Registry`]. Resolvers are
//! no-ops on inputs lacking their metadata, so the orchestrator can run the
//! full set against every manifest unconditionally.
//!
//! The method resolvers run in a fixed, documented order per handler. Since
//! each writes a disjoint table the order is not semantically significant,
//! with one exception it does encode: [`TransformParamResolver`] runs after
//! [`PipeResolver`], so the built-in transform pipe lands after any
//! user-declared pipes.

mod client;
mod command;
mod guard;
mod guard_class;
mod middleware;
mod on_event;
mod once_event;
mod param;
mod pipe;
mod pipe_class;
mod transform_param;

pub(crate) use client::ClientResolver;
pub(crate) use command::CommandResolver;
pub(crate) use guard::GuardResolver;
pub(crate) use guard_class::GuardClassResolver;
pub(crate) use middleware::MiddlewareResolver;
pub(crate) use on_event::OnEventResolver;
pub(crate) use once_event::OnceEventResolver;
pub(crate) use param::ParamResolver;
pub(crate) use pipe::PipeResolver;
pub(crate) use pipe_class::PipeClassResolver;
pub(crate) use transform_param::TransformParamResolver;

use accord_core::RegistryError;

use crate::handler::HandlerKey;
use crate::manifest::{HandlerSpec, Manifest};
use crate::registry::Registry;

/// A resolver acting on class-level manifest metadata.
pub(crate) trait ClassResolver: Send + Sync {
    /// The resolver name, for startup diagnostics.
    fn name(&self) -> &'static str;

    /// Inspects the manifest and performs this resolver's registration.
    fn resolve(&self, manifest: &Manifest, registry: &Registry) -> Result<(), RegistryError>;
}

/// A resolver acting on one handler spec of a manifest.
pub(crate) trait MethodResolver: Send + Sync {
    /// The resolver name, for startup diagnostics.
    fn name(&self) -> &'static str;

    /// Inspects the handler spec and performs this resolver's registration.
    fn resolve(
        &self,
        handler: &HandlerSpec,
        key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError>;
}

/// The class-level resolvers, in the order they run per manifest.
pub(crate) fn class_resolvers() -> Vec<Box<dyn ClassResolver>> {
    vec![
        Box::new(ClientResolver),
        Box::new(MiddlewareResolver),
        Box::new(GuardClassResolver),
        Box::new(PipeClassResolver),
    ]
}

/// The method-level resolvers, in the order they run per handler.
pub(crate) fn method_resolvers() -> Vec<Box<dyn MethodResolver>> {
    vec![
        Box::new(GuardResolver),
        Box::new(OnEventResolver),
        Box::new(CommandResolver),
        Box::new(OnceEventResolver),
        Box::new(PipeResolver),
        Box::new(ParamResolver),
        Box::new(TransformParamResolver),
    ]
}
