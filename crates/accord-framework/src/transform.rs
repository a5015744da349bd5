//! The built-in transform pipe.
//!
//! Populates a fresh DTO instance from the option values carried on an
//! interaction. The pipe clones the leaf's DTO template and, for every
//! property, consults the metadata side-table:
//!
//! - no metadata registered: the property keeps its template default
//!   (silently skipped, not an error);
//! - metadata present: the option named by the metadata (falling back to the
//!   property name) is fetched from the interaction, with the `required`
//!   flag passed through to the event-source boundary. A missing required
//!   option errors there; a missing optional one yields null.
//!
//! Non-interaction events and handlers without a DTO template pass the
//! pipeline value through untouched.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use accord_core::MetadataRegistry;

use crate::context::InvocationContext;
use crate::error::HandlerError;
use crate::pipe::PipeTransform;

/// The filled DTO stashed in the invocation state for the
/// [`Payload`](crate::extractor::Payload) extractor.
#[derive(Debug, Clone)]
pub(crate) struct DtoValue(pub Value);

/// Fills the declared DTO from interaction options.
///
/// Appended automatically, after any user pipes, to every handler that
/// declares a DTO.
#[derive(Clone)]
pub struct TransformPipe {
    metadata: Arc<MetadataRegistry>,
}

impl TransformPipe {
    /// Creates the pipe over the shared metadata side-table.
    pub fn new(metadata: Arc<MetadataRegistry>) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl PipeTransform for TransformPipe {
    async fn transform(
        &self,
        ctx: &InvocationContext,
        value: Option<Value>,
    ) -> Result<Option<Value>, HandlerError> {
        let Some(interaction) = ctx.event().as_interaction() else {
            return Ok(value);
        };
        let Some(template) = ctx.node().and_then(|n| n.leaf()).and_then(|l| l.dto.as_ref())
        else {
            return Ok(value);
        };

        let mut dto = template.values.clone();
        for (property, slot) in dto.iter_mut() {
            let Some(spec) = self.metadata.param_metadata(template.type_id, property) else {
                trace!(dto = template.type_name, property = %property, "No param metadata, skipping");
                continue;
            };
            let option_name = spec.name.as_deref().unwrap_or(property);
            *slot = interaction
                .option(option_name, spec.required)?
                .unwrap_or(Value::Null);
        }

        let filled = Value::Object(dto);
        ctx.set_state(DtoValue(filled.clone()));
        Ok(Some(filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerKey;
    use crate::tree::{CommandTree, Leaf};
    use accord_core::{
        CommandDto, CommandInteraction, CommandPath, DtoSchema, DtoTemplate, MessageEvent,
        OptionError, ParamSpec,
    };
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::any::TypeId;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct GreetDto {
        target: String,
        greeting: String,
        untracked: String,
    }

    impl CommandDto for GreetDto {
        fn schema() -> DtoSchema {
            DtoSchema::new("GreetDto")
                .param("target", ParamSpec::new().required(true))
                .param("greeting", ParamSpec::named("style"))
        }
    }

    fn setup(interaction: CommandInteraction) -> (TransformPipe, InvocationContext) {
        let metadata = Arc::new(MetadataRegistry::new());
        metadata.register_schema(TypeId::of::<GreetDto>(), &GreetDto::schema());

        let tree = CommandTree::new();
        let node = tree
            .register(
                &CommandPath::command("greet"),
                Leaf {
                    key: HandlerKey::new("greet"),
                    handler: Arc::new(|_| Box::pin(async { Ok(()) })),
                    dto: Some(DtoTemplate::of::<GreetDto>().unwrap()),
                },
            )
            .unwrap();

        let ctx = InvocationContext::new(Arc::new(interaction), None, Some(node));
        (TransformPipe::new(metadata), ctx)
    }

    #[tokio::test]
    async fn fills_declared_properties_and_skips_the_rest() {
        let (pipe, ctx) = setup(
            CommandInteraction::new("greet")
                .with_option("target", "world")
                .with_option("style", "loud"),
        );

        let value = pipe.transform(&ctx, None).await.unwrap().unwrap();
        assert_eq!(
            value,
            json!({"target": "world", "greeting": "loud", "untracked": ""})
        );
        // The filled DTO is stashed for the Payload extractor.
        assert!(ctx.has_state::<DtoValue>());
    }

    #[tokio::test]
    async fn missing_optional_option_yields_null() {
        let (pipe, ctx) = setup(CommandInteraction::new("greet").with_option("target", "world"));
        let value = pipe.transform(&ctx, None).await.unwrap().unwrap();
        assert_eq!(value["greeting"], Value::Null);
    }

    #[tokio::test]
    async fn missing_required_option_errors_at_the_boundary() {
        let (pipe, ctx) = setup(CommandInteraction::new("greet"));
        let err = pipe.transform(&ctx, None).await.unwrap_err();
        assert!(err.downcast_ref::<OptionError>().is_some());
    }

    #[tokio::test]
    async fn non_interaction_events_pass_through() {
        let metadata = Arc::new(MetadataRegistry::new());
        let pipe = TransformPipe::new(metadata);
        let ctx = InvocationContext::new(Arc::new(MessageEvent::new("hi")), None, None);

        let passthrough = json!({"x": 1});
        let value = pipe.transform(&ctx, Some(passthrough.clone())).await.unwrap();
        assert_eq!(value, Some(passthrough));
        assert!(!ctx.has_state::<DtoValue>());
    }
}
