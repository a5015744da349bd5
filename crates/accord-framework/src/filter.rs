//! Exception filters: typed error handling for failed invocations.
//!
//! When a handler (or a pipe) errors, the router offers the error to the
//! registered filters in registration order; the first filter whose
//! [`catches`](ExceptionFilter::catches) returns `true` handles it and the
//! dispatch completes normally. An error no filter catches is not swallowed;
//! it propagates to the caller as a dispatch error.

use async_trait::async_trait;

use crate::context::InvocationContext;
use crate::error::HandlerError;

/// A typed error handler matched against thrown invocation errors.
#[async_trait]
pub trait ExceptionFilter: Send + Sync {
    /// Whether this filter handles the given error.
    ///
    /// Typically implemented with [`error_is`].
    fn catches(&self, error: &HandlerError) -> bool;

    /// Handles a caught error.
    async fn catch(&self, error: &HandlerError, ctx: &InvocationContext);
}

/// Returns whether a handler error is of concrete type `E`.
///
/// ```rust,ignore
/// fn catches(&self, error: &HandlerError) -> bool {
///     error_is::<BanError>(error)
/// }
/// ```
pub fn error_is<E: std::error::Error + 'static>(error: &HandlerError) -> bool {
    error.downcast_ref::<E>().is_some()
}
