//! Middleware: cross-cutting stages run after guards pass.
//!
//! Middleware may mutate the shared invocation state and short-circuits the
//! pipeline by erroring. Registration is class-level on a manifest; all
//! registered middleware runs for every invocation, in registration order.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::InvocationContext;
use crate::error::HandlerError;

/// A cross-cutting pipeline stage.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs the middleware for one invocation.
    ///
    /// Erroring aborts the rest of the pipeline.
    async fn handle(&self, ctx: &InvocationContext) -> Result<(), HandlerError>;
}

/// Blanket implementation for async closures.
#[async_trait]
impl<F> Middleware for F
where
    F: for<'a> Fn(&'a InvocationContext) -> BoxFuture<'a, Result<(), HandlerError>> + Send + Sync,
{
    async fn handle(&self, ctx: &InvocationContext) -> Result<(), HandlerError> {
        self(ctx).await
    }
}
