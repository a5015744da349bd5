//! # Accord
//!
//! A metadata-driven, type-safe command and event routing framework for
//! chat bots.
//!
//! ## Overview
//!
//! Accord routes platform events to user handlers through explicit metadata:
//! modules declare manifests, a startup orchestrator resolves them into an
//! immutable router, and each incoming event flows through a staged pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌────────────────────────────────────┐
//! │ Modules  │───▶│ Orchestrator │───▶│ Router                             │
//! │(manifests)│   │ (resolvers)  │    │  guards ▸ middleware ▸ pipes ▸ fn  │
//! └──────────┘    └──────────────┘    └────────────────────────────────────┘
//! ```
//!
//! - **Manifests**: Declarative registrations of commands, listeners, guards,
//!   pipes and filters
//! - **Orchestrator**: Scans manifests concurrently at startup; any
//!   configuration error is fatal before the router exists
//! - **Router**: Frozen dispatch tables; resolves interactions against the
//!   command tree and runs the invocation pipeline
//! - **Handlers**: User-defined async functions with extracted parameters
//!   (Axum-style)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use accord::prelude::*;
//!
//! #[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
//! struct PingDto {
//!     target: String,
//! }
//!
//! impl CommandDto for PingDto {
//!     fn schema() -> DtoSchema {
//!         DtoSchema::new("PingDto").param("target", ParamSpec::new().required(true))
//!     }
//! }
//!
//! async fn ping(Payload(dto): Payload<PingDto>) -> String {
//!     format!("pong, {}", dto.target)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = accord::runtime::load_config()?;
//!     accord::runtime::logging::init_from_config(&config.logging);
//!
//!     let router = Orchestrator::new()
//!         .manifest(
//!             Manifest::new("ping")
//!                 .guard(AccessGuard::new(AccessEvaluator::new(config.access)))
//!                 .handler(command("ping").dto::<PingDto>().handler(ping)),
//!         )
//!         .resolve()
//!         .await?;
//!
//!     // feed adapter events into router.dispatch(...)
//!     Ok(())
//! }
//! ```

pub use accord_core as core;
pub use accord_framework as framework;
pub use accord_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use accord::prelude::*;
/// ```
pub mod prelude {
    // Orchestration - the startup entry point
    pub use accord_framework::{DispatchOutcome, Orchestrator, Router};

    // Manifest building
    pub use accord_framework::{Manifest, Module, command, on, once, subcommand};

    // Pipeline contracts
    pub use accord_framework::{ExceptionFilter, Guard, Middleware, PipeTransform, error_is};

    // Extractors - for handler parameters
    pub use accord_framework::{Channel, EventRef, FromContext, Payload, RawOptions};

    // Built-ins
    pub use accord_framework::{AccessGuard, TransformPipe};

    // Client binding
    pub use accord_framework::{BoxedClient, Client};

    // Core event and metadata types
    pub use accord_core::{
        AccessConfig, AccessEvaluator, BoxedEvent, CommandDto, CommandInteraction, CommandPath,
        DtoSchema, Event, EventKind, Interaction, MessageEvent, ParamSpec,
    };

    // Runtime glue
    pub use accord_runtime::{AccordConfig, ConfigLoader, LoggingBuilder};
}
