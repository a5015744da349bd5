//! Records a handler's method-level pipes.

use accord_core::RegistryError;

use super::MethodResolver;
use crate::handler::HandlerKey;
use crate::manifest::HandlerSpec;
use crate::registry::Registry;

pub(crate) struct PipeResolver;

impl MethodResolver for PipeResolver {
    fn name(&self) -> &'static str {
        "pipe"
    }

    fn resolve(
        &self,
        handler: &HandlerSpec,
        key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError> {
        if !handler.pipes.is_empty() {
            registry.add_handler_pipes(key, &handler.pipes);
        }
        Ok(())
    }
}
