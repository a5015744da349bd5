//! Registers class-level pipes into the global pipe list.
//!
//! Global pipes run for every invocation, before any method-level pipes.

use accord_core::RegistryError;

use super::ClassResolver;
use crate::manifest::Manifest;
use crate::registry::Registry;

pub(crate) struct PipeClassResolver;

impl ClassResolver for PipeClassResolver {
    fn name(&self) -> &'static str {
        "pipe-class"
    }

    fn resolve(&self, manifest: &Manifest, registry: &Registry) -> Result<(), RegistryError> {
        registry
            .global_pipes
            .write()
            .extend(manifest.pipes.iter().cloned());
        Ok(())
    }
}
