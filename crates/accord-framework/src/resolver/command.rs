//! Inserts command tree nodes for command-bound handlers.
//!
//! The leaf gets the owning handler and one template DTO instance whose
//! shape the transform pipe fills per invocation. Duplicate sibling names
//! surface here as fatal configuration errors.

use accord_core::RegistryError;
use tracing::debug;

use super::MethodResolver;
use crate::handler::HandlerKey;
use crate::manifest::{Binding, HandlerSpec};
use crate::registry::Registry;
use crate::tree::Leaf;

pub(crate) struct CommandResolver;

impl MethodResolver for CommandResolver {
    fn name(&self) -> &'static str {
        "command"
    }

    fn resolve(
        &self,
        handler: &HandlerSpec,
        key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError> {
        let Binding::Command(path) = &handler.binding else {
            return Ok(());
        };
        let dto = handler.dto.as_ref().map(|d| d.template()).transpose()?;
        let node = registry.tree.register(
            path,
            Leaf {
                key: key.clone(),
                handler: handler.handler.clone(),
                dto,
            },
        )?;
        debug!(path = %node.path(), handler = %key, "Registered command");
        Ok(())
    }
}
