//! Handler system for the Accord framework.
//!
//! Handlers are plain async functions adapted through blanket
//! implementations for different arities, with parameter injection via
//! [`FromContext`]: each parameter type knows how to extract itself from the
//! [`InvocationContext`]. Return values are converted through
//! [`IntoHandlerResult`], so a handler may return `()`, a `String` reply, an
//! `Option`, or a `Result` whose error flows into the exception filters.
//!
//! # Example
//!
//! ```rust,ignore
//! use accord_framework::{Payload, Channel};
//!
//! // Reply with a string, filled DTO injected
//! async fn ping(payload: Payload<PingDto>) -> String {
//!     format!("pong, {}", payload.target)
//! }
//!
//! // Fallible handler; the error is routed to exception filters
//! async fn ban(payload: Payload<BanDto>, channel: Channel) -> Result<(), BanError> {
//!     // ...
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::client::ClientError;
use crate::context::InvocationContext;
use crate::error::HandlerError;
use crate::extractor::FromContext;

// ============================================================================
// Handler identity
// ============================================================================

/// Identity of one registered handler.
///
/// Resolvers write per-handler registrations (guards, pipes) into tables
/// keyed by this; the router reads them back at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey(Arc<str>);

impl HandlerKey {
    /// Creates a key from its string form.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Builds the key for one handler spec within a manifest.
    pub(crate) fn of(manifest: &str, index: usize, handler: &str) -> Self {
        Self(Arc::from(format!("{manifest}::{index}:{handler}").as_str()))
    }
}

impl std::fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// IntoHandlerResult - convert handler return values
// ============================================================================

/// Conversion of handler return values into the pipeline result.
#[async_trait]
pub trait IntoHandlerResult: Send {
    /// Converts this value, performing any response side effect.
    async fn into_result(self, ctx: Arc<InvocationContext>) -> Result<(), HandlerError>;
}

#[async_trait]
impl IntoHandlerResult for () {
    async fn into_result(self, _ctx: Arc<InvocationContext>) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// A `String` return value is sent as a reply to the event's channel.
///
/// Requires a bound client and an event with channel context; a send failure
/// surfaces as a handler error so exception filters can observe it.
#[async_trait]
impl IntoHandlerResult for String {
    async fn into_result(self, ctx: Arc<InvocationContext>) -> Result<(), HandlerError> {
        let Some(client) = ctx.client_arc() else {
            return Err(Box::new(ClientError::NotConnected));
        };
        let Some(channel_id) = ctx.event().channel_id().map(str::to_string) else {
            return Err(Box::new(ClientError::SendFailed(
                "event carries no channel context".into(),
            )));
        };
        client.send(&channel_id, &self).await?;
        Ok(())
    }
}

/// On `Some`, the inner value's conversion runs; on `None`, nothing happens.
#[async_trait]
impl<T: IntoHandlerResult> IntoHandlerResult for Option<T> {
    async fn into_result(self, ctx: Arc<InvocationContext>) -> Result<(), HandlerError> {
        match self {
            Some(value) => value.into_result(ctx).await,
            None => Ok(()),
        }
    }
}

/// On `Ok`, the inner value's conversion runs; on `Err`, the error is handed
/// to the exception filters.
#[async_trait]
impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: IntoHandlerResult,
    E: std::error::Error + Send + Sync + 'static,
{
    async fn into_result(self, ctx: Arc<InvocationContext>) -> Result<(), HandlerError> {
        match self {
            Ok(value) => value.into_result(ctx).await,
            Err(e) => Err(Box::new(e)),
        }
    }
}

// ============================================================================
// RouteHandler trait
// ============================================================================

/// The core trait for route handlers.
///
/// Automatically implemented for async functions taking 0 to 8 parameters
/// that implement [`FromContext`] and returning an [`IntoHandlerResult`].
#[async_trait]
pub trait RouteHandler<T>: Clone + Send + Sync + 'static {
    /// Calls the handler with parameters extracted from the context.
    async fn call(self, ctx: Arc<InvocationContext>) -> Result<(), HandlerError>;
}

/// A type-erased handler stored in registration tables.
///
/// Internally a closure capturing the original handler, invoked with a
/// cloned copy per dispatch.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<InvocationContext>) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: RouteHandler<T> + Send + Sync + 'static,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

/// Generates `RouteHandler` implementations for each function arity.
macro_rules! impl_route_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> RouteHandler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoHandlerResult + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<InvocationContext>) -> Result<(), HandlerError> {
                $(
                    let $ty = $ty::from_context(&ctx)?;
                )*

                let res = (self)($($ty,)*).await;
                res.into_result(ctx).await
            }
        }
    };
}

impl_route_handler!();
impl_route_handler!(T1);
impl_route_handler!(T1, T2);
impl_route_handler!(T1, T2, T3);
impl_route_handler!(T1, T2, T3, T4);
impl_route_handler!(T1, T2, T3, T4, T5);
impl_route_handler!(T1, T2, T3, T4, T5, T6);
impl_route_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_route_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use super::*;
    use accord_core::{BoxedEvent, MessageEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx() -> Arc<InvocationContext> {
        Arc::new(InvocationContext::new(
            Arc::new(MessageEvent::new("hi").channel("C1")),
            None,
            None,
        ))
    }

    #[tokio::test]
    async fn zero_arity_handler_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let handler = into_handler(move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        handler(ctx()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn event_parameter_is_injected() {
        let handler = into_handler(|event: BoxedEvent| async move {
            assert_eq!(event.event_name(), "message_create");
        });
        handler(ctx()).await.unwrap();
    }

    #[tokio::test]
    async fn handler_errors_surface() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let handler = into_handler(|| async move { Err::<(), _>(Boom) });
        let err = handler(ctx()).await.unwrap_err();
        assert!(err.downcast_ref::<Boom>().is_some());
    }

    #[tokio::test]
    async fn string_reply_without_client_is_an_error() {
        let handler = into_handler(|| async move { "pong".to_string() });
        let err = handler(ctx()).await.unwrap_err();
        assert!(err.downcast_ref::<ClientError>().is_some());
    }
}
