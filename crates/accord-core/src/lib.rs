//! # Accord Core
//!
//! Foundation layer of the Accord interaction routing framework.
//!
//! This crate provides the building blocks shared by the routing layer:
//!
//! - **Event System**: Type-erased platform events with runtime downcasting
//!   ([`Event`], [`BoxedEvent`]) and the [`Interaction`] contract for
//!   command-shaped events with a per-name option lookup
//! - **Metadata Side-Table**: Explicit per-DTO option metadata declared once
//!   per type and looked up by identity ([`MetadataRegistry`], [`DtoSchema`])
//! - **Access Evaluation**: Pure allow/deny predicates over a read-only
//!   configuration ([`AccessEvaluator`])
//!
//! The routing layer itself (command tree, resolvers, invocation pipeline)
//! lives in `accord-framework`; this crate carries no async machinery.

pub mod access;
pub mod error;
pub mod event;
pub mod interaction;
pub mod metadata;

pub use access::{AccessConfig, AccessEvaluator, ChannelRestriction};
pub use error::{OptionError, RegistryError};
pub use event::{BoxedEvent, CommandPath, Event, EventKind, Interaction};
pub use interaction::{CommandInteraction, CommandOption, MessageEvent};
pub use metadata::{CommandDto, DtoSchema, DtoTemplate, MetadataRegistry, ParamSpec};

/// Prelude for common imports.
pub mod prelude {
    pub use super::access::{AccessConfig, AccessEvaluator};
    pub use super::error::{OptionError, RegistryError};
    pub use super::event::{BoxedEvent, CommandPath, Event, EventKind, Interaction};
    pub use super::metadata::{CommandDto, DtoSchema, DtoTemplate, MetadataRegistry, ParamSpec};
}
