//! # Accord Framework
//!
//! Metadata-driven command and event routing for bot applications.
//!
//! This layer provides:
//! - Manifest builders for declaring commands, listeners and pipeline stages
//! - Handler trait for Axum-style dependency injection
//! - Startup resolution (orchestrator + resolvers) that freezes manifests
//!   into an immutable [`Router`]
//! - The staged invocation pipeline: guards, middleware, pipes, handler,
//!   exception filters
//!
//! The framework layer is built on top of core types but adds the
//! higher-level routing abstractions that applications actually register
//! against.

pub mod client;
pub mod context;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod guard;
pub mod handler;
pub mod manifest;
pub mod middleware;
pub mod orchestrator;
pub mod pipe;
pub mod router;
pub mod transform;
pub mod tree;

mod registry;
mod resolver;

pub use client::{BoxedClient, Client, ClientError, ClientResult, downcast_client};
pub use context::InvocationContext;
pub use error::{DispatchError, ExtractError, ExtractResult, HandlerError};
pub use extractor::{Channel, EventRef, FromContext, Payload, RawOptions};
pub use filter::{ExceptionFilter, error_is};
pub use guard::{AccessGuard, Guard};
pub use handler::{BoxedHandler, HandlerKey, IntoHandlerResult, RouteHandler, into_handler};
pub use manifest::{
    Binding, DtoDeclaration, HandlerDraft, HandlerSpec, Manifest, Module, command, on, once,
    subcommand,
};
pub use middleware::Middleware;
pub use orchestrator::Orchestrator;
pub use pipe::PipeTransform;
pub use router::{DispatchOutcome, Router};
pub use transform::TransformPipe;
pub use tree::{CommandNode, CommandTree, NodeKind};

/// Common imports for application modules.
pub mod prelude {
    pub use crate::client::{BoxedClient, Client};
    pub use crate::context::InvocationContext;
    pub use crate::error::HandlerError;
    pub use crate::extractor::{Channel, EventRef, FromContext, Payload, RawOptions};
    pub use crate::filter::ExceptionFilter;
    pub use crate::guard::Guard;
    pub use crate::manifest::{Manifest, Module, command, on, once, subcommand};
    pub use crate::middleware::Middleware;
    pub use crate::orchestrator::Orchestrator;
    pub use crate::pipe::PipeTransform;
    pub use crate::router::{DispatchOutcome, Router};

    pub use accord_core::prelude::*;
}
