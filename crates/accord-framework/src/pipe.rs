//! Pipes: transforming stages that thread a value toward the handler.
//!
//! Pipes run after middleware, in registration order, each receiving the
//! value produced by the previous pipe. The built-in
//! [`TransformPipe`](crate::transform::TransformPipe) is appended last for
//! handlers that declared a DTO and produces the fully populated object.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::InvocationContext;
use crate::error::HandlerError;

/// A pipeline stage that transforms or validates the threaded value.
#[async_trait]
pub trait PipeTransform: Send + Sync {
    /// Transforms the value flowing toward the handler.
    ///
    /// Returning the value unchanged is an expected skip, not a failure.
    async fn transform(
        &self,
        ctx: &InvocationContext,
        value: Option<Value>,
    ) -> Result<Option<Value>, HandlerError>;
}
