//! Records a handler's method-level guards.

use accord_core::RegistryError;

use super::MethodResolver;
use crate::handler::HandlerKey;
use crate::manifest::HandlerSpec;
use crate::registry::Registry;

pub(crate) struct GuardResolver;

impl MethodResolver for GuardResolver {
    fn name(&self) -> &'static str {
        "guard"
    }

    fn resolve(
        &self,
        handler: &HandlerSpec,
        key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError> {
        if !handler.guards.is_empty() {
            registry.add_handler_guards(key, &handler.guards);
        }
        Ok(())
    }
}
