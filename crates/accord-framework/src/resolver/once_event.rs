//! Attaches listeners fired at most once.

use accord_core::RegistryError;
use tracing::debug;

use super::MethodResolver;
use crate::handler::HandlerKey;
use crate::manifest::{Binding, HandlerSpec};
use crate::registry::Registry;

pub(crate) struct OnceEventResolver;

impl MethodResolver for OnceEventResolver {
    fn name(&self) -> &'static str {
        "once-event"
    }

    fn resolve(
        &self,
        handler: &HandlerSpec,
        key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError> {
        let Binding::Once(event_name) = &handler.binding else {
            return Ok(());
        };
        registry.add_listener(event_name, key.clone(), handler.handler.clone(), true);
        debug!(event = %event_name, handler = %key, "Attached once-listener");
        Ok(())
    }
}
