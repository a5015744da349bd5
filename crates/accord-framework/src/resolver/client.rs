//! Binds the platform client handle declared on a manifest.

use accord_core::RegistryError;
use tracing::debug;

use super::ClassResolver;
use crate::manifest::Manifest;
use crate::registry::Registry;

pub(crate) struct ClientResolver;

impl ClassResolver for ClientResolver {
    fn name(&self) -> &'static str {
        "client"
    }

    fn resolve(&self, manifest: &Manifest, registry: &Registry) -> Result<(), RegistryError> {
        let Some(client) = &manifest.client else {
            return Ok(());
        };
        registry.bind_client(client.clone())?;
        debug!(manifest = manifest.name(), client = client.id(), "Bound client");
        Ok(())
    }
}
