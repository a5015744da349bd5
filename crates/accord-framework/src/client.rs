//! Client handle abstraction.
//!
//! The routing layer does not own the platform connection; it receives one
//! long-lived client handle at resolution time (via a manifest's
//! [`client`](crate::manifest::Manifest::client) binding) and uses it to send
//! replies. Handlers can inject the handle as a [`BoxedClient`] parameter or
//! downcast it to a concrete type for platform-specific APIs.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a client handle.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The client is not connected to the platform.
    #[error("client not connected")]
    NotConnected,

    /// The platform rejected the send.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// A handle to the externally owned platform client.
#[async_trait]
pub trait Client: Send + Sync {
    /// Returns the client's identifier.
    fn id(&self) -> &str;

    /// Sends a text message to a channel.
    async fn send(&self, channel_id: &str, content: &str) -> ClientResult<()>;

    /// Returns self as `Any` for downcasting to a concrete client type.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A type-erased, cheaply cloneable client handle.
pub type BoxedClient = Arc<dyn Client>;

/// Downcasts a boxed client to a concrete client type.
pub fn downcast_client<T: Client + 'static>(client: BoxedClient) -> Option<Arc<T>> {
    client.as_any().downcast::<T>().ok()
}
