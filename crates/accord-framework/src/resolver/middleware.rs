//! Registers class-level middleware into the global middleware list.

use accord_core::RegistryError;

use super::ClassResolver;
use crate::manifest::Manifest;
use crate::registry::Registry;

pub(crate) struct MiddlewareResolver;

impl ClassResolver for MiddlewareResolver {
    fn name(&self) -> &'static str {
        "middleware"
    }

    fn resolve(&self, manifest: &Manifest, registry: &Registry) -> Result<(), RegistryError> {
        registry
            .global_middleware
            .write()
            .extend(manifest.middleware.iter().cloned());
        Ok(())
    }
}
