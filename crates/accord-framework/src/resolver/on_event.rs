//! Attaches repeating event listeners.
//!
//! Registration is append-only: the same handler bound twice yields two
//! independent listeners.

use accord_core::RegistryError;
use tracing::debug;

use super::MethodResolver;
use crate::handler::HandlerKey;
use crate::manifest::{Binding, HandlerSpec};
use crate::registry::Registry;

pub(crate) struct OnEventResolver;

impl MethodResolver for OnEventResolver {
    fn name(&self) -> &'static str {
        "on-event"
    }

    fn resolve(
        &self,
        handler: &HandlerSpec,
        key: &HandlerKey,
        registry: &Registry,
    ) -> Result<(), RegistryError> {
        let Binding::On(event_name) = &handler.binding else {
            return Ok(());
        };
        registry.add_listener(event_name, key.clone(), handler.handler.clone(), false);
        debug!(event = %event_name, handler = %key, "Attached listener");
        Ok(())
    }
}
