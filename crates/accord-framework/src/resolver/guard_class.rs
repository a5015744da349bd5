//! Registers class-level guards into the global guard list.
//!
//! Global guards run for every invocation, before any method-level guards.

use accord_core::RegistryError;

use super::ClassResolver;
use crate::manifest::Manifest;
use crate::registry::Registry;

pub(crate) struct GuardClassResolver;

impl ClassResolver for GuardClassResolver {
    fn name(&self) -> &'static str {
        "guard-class"
    }

    fn resolve(&self, manifest: &Manifest, registry: &Registry) -> Result<(), RegistryError> {
        registry
            .global_guards
            .write()
            .extend(manifest.guards.iter().cloned());
        Ok(())
    }
}
