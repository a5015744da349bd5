//! Appends the built-in transform pipe to DTO-declaring handlers.
//!
//! Runs after the pipe resolver, so the transform pipe always lands after
//! any user-declared pipes for the same handler.

use std::sync::Arc;

use accord_core::RegistryError;

use super::MethodResolver;
use crate::handler::HandlerKey;
use crate::manifest::HandlerSpec;
use crate::registry::Registry;
use crate::transform::TransformPipe;

pub(crate) struct TransformParamResolver;

impl MethodResolver for TransformParamResolver {
    fn name(&self) -> &'static str {
        "transform-param"
    }

    fn resolve(
        &self,
        handler: &HandlerSpec,
        key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError> {
        if handler.dto.is_none() {
            return Ok(());
        }
        registry.push_handler_pipe(key, Arc::new(TransformPipe::new(registry.metadata())));
        Ok(())
    }
}
