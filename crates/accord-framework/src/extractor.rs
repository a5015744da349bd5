//! Parameter extraction for handler functions.
//!
//! This module provides the [`FromContext`] trait, which defines how handler
//! parameter types are resolved from an [`InvocationContext`], plus the
//! built-in extractors: the dispatched event, the bound client, the filled
//! DTO ([`Payload`]), the raw option map ([`RawOptions`]), and the
//! originating channel ([`Channel`]).

use std::ops::Deref;
use std::sync::Arc;

use serde_json::{Map, Value};

use accord_core::{BoxedEvent, CommandDto, Event};

use crate::client::BoxedClient;
use crate::context::InvocationContext;
use crate::error::ExtractError;
use crate::transform::DtoValue;

/// A trait for types that can be extracted from an [`InvocationContext`].
///
/// Extraction can fail when the required data is not available; the failure
/// surfaces as a handler error and flows into the exception filters.
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError>;
}

/// Extracts the dispatched event as a type-erased handle.
impl FromContext for BoxedEvent {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        Ok(ctx.event().clone())
    }
}

/// Extracts the full invocation context.
impl FromContext for Arc<InvocationContext> {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        Ok(Arc::clone(ctx))
    }
}

/// Extracts the bound client handle.
impl FromContext for BoxedClient {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        ctx.client_arc().ok_or(ExtractError::ClientNotBound)
    }
}

/// Makes any extractor optional: failures become `None`.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        Ok(T::from_context(ctx).ok())
    }
}

/// Extracts a concrete event type by downcasting.
///
/// ```rust,ignore
/// async fn on_message(event: EventRef<MessageEvent>) {
///     println!("{}", event.content);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EventRef<T>(pub T);

impl<T> Deref for EventRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Event + Clone> FromContext for EventRef<T> {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        ctx.event()
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .map(EventRef)
            .ok_or_else(|| ExtractError::EventTypeMismatch {
                expected: std::any::type_name::<T>(),
                got: ctx.event().event_name().to_string(),
            })
    }
}

/// Extracts the channel id the event originated from, if any.
#[derive(Debug, Clone)]
pub struct Channel(pub Option<String>);

impl FromContext for Channel {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        Ok(Channel(ctx.event().channel_id().map(str::to_string)))
    }
}

/// Extracts the DTO filled by the transform pipe, deserialized into `T`.
///
/// Requires that the handler declared `T` as its DTO, so the transform pipe
/// ran and stashed the filled value in the context.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: CommandDto> FromContext for Payload<T> {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        let DtoValue(value) = ctx
            .get_state::<DtoValue>()
            .ok_or(ExtractError::PayloadUnavailable {
                dto: std::any::type_name::<T>(),
            })?;
        serde_json::from_value(value)
            .map(Payload)
            .map_err(|e| ExtractError::custom(format!("payload deserialization failed: {e}")))
    }
}

/// Extracts the filled DTO as a raw JSON object.
#[derive(Debug, Clone)]
pub struct RawOptions(pub Map<String, Value>);

impl FromContext for RawOptions {
    fn from_context(ctx: &Arc<InvocationContext>) -> Result<Self, ExtractError> {
        match ctx.get_state::<DtoValue>() {
            Some(DtoValue(Value::Object(map))) => Ok(RawOptions(map)),
            _ => Err(ExtractError::PayloadUnavailable {
                dto: "RawOptions",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_core::MessageEvent;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    struct PingDto {
        target: String,
    }

    impl CommandDto for PingDto {
        fn schema() -> accord_core::DtoSchema {
            accord_core::DtoSchema::new("PingDto")
                .param("target", accord_core::ParamSpec::new().required(true))
        }
    }

    fn ctx() -> Arc<InvocationContext> {
        Arc::new(InvocationContext::new(
            Arc::new(MessageEvent::new("hi").channel("C1")),
            None,
            None,
        ))
    }

    #[test]
    fn channel_and_event_extract() {
        let ctx = ctx();
        let Channel(channel) = Channel::from_context(&ctx).unwrap();
        assert_eq!(channel.as_deref(), Some("C1"));

        let event = EventRef::<MessageEvent>::from_context(&ctx).unwrap();
        assert_eq!(event.content, "hi");
    }

    #[test]
    fn typed_event_mismatch_reports_names() {
        let ctx = ctx();
        let err =
            EventRef::<accord_core::CommandInteraction>::from_context(&ctx).unwrap_err();
        assert!(matches!(err, ExtractError::EventTypeMismatch { .. }));
    }

    #[test]
    fn payload_requires_a_filled_dto() {
        let ctx = ctx();
        assert!(matches!(
            Payload::<PingDto>::from_context(&ctx),
            Err(ExtractError::PayloadUnavailable { .. })
        ));

        ctx.set_state(DtoValue(json!({"target": "world"})));
        let payload = Payload::<PingDto>::from_context(&ctx).unwrap();
        assert_eq!(payload.target, "world");
    }

    #[test]
    fn optional_extractor_absorbs_failures() {
        let ctx = ctx();
        let client = Option::<BoxedClient>::from_context(&ctx).unwrap();
        assert!(client.is_none());
    }
}
