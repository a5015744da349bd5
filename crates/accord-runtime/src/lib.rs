//! Accord Runtime - configuration and logging glue for Accord applications.
//!
//! This crate provides:
//! - Layered configuration loading (TOML files + `ACCORD_*` environment
//!   variables) via figment
//! - Logging initialization over `tracing-subscriber`
//!
//! The typical application entry point loads the configuration, initializes
//! logging from it, and feeds the access section to an
//! `AccessGuard`:
//!
//! ```rust,ignore
//! use accord_runtime::config::load_config;
//! use accord_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! let evaluator = accord_core::AccessEvaluator::new(config.access);
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AccordConfig, ConfigLoader, LogFormat, LogLevel, LoggingConfig, load_config};
pub use error::{ConfigError, ConfigResult};
pub use logging::LoggingBuilder;

// Re-export tracing for use by application crates
pub use tracing;
pub use tracing_subscriber;
