//! Error types for the Accord routing layer.

use thiserror::Error;

/// A type-erased error surfaced by a pipeline stage or handler.
///
/// Exception filters match against this via downcasting; see
/// [`error_is`](crate::filter::error_is).
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during parameter extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The event type does not match the expected type.
    #[error("event type mismatch: expected '{expected}', got '{got}'")]
    EventTypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual event name.
        got: String,
    },

    /// A `Payload<T>` parameter was requested but no DTO was filled.
    ///
    /// Usually means the handler declared no DTO, so the transform pipe never
    /// ran.
    #[error("payload '{dto}' not available; was a DTO declared for this handler?")]
    PayloadUnavailable {
        /// The requested DTO type name.
        dto: &'static str,
    },

    /// A client parameter was requested but no client was bound.
    #[error("no client bound during resolution")]
    ClientNotBound,

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors escaping a single dispatch.
///
/// Guard rejection and unmatched command paths are *not* errors; they are
/// silent [`DispatchOutcome`](crate::router::DispatchOutcome)s. A
/// `DispatchError` is only produced when a stage throws, and for handler and
/// pipe errors only after no exception filter matched.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A guard threw while evaluating.
    #[error("guard error: {source}")]
    Guard {
        /// The underlying error.
        #[source]
        source: HandlerError,
    },

    /// A middleware stage threw.
    #[error("middleware error: {source}")]
    Middleware {
        /// The underlying error.
        #[source]
        source: HandlerError,
    },

    /// A handler or pipe error that no exception filter caught.
    #[error("unhandled handler error: {source}")]
    Unhandled {
        /// The underlying error.
        #[source]
        source: HandlerError,
    },
}
