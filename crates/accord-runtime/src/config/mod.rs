//! Configuration module for the Accord runtime.
//!
//! Provides TOML and environment based configuration loading for logging
//! and access control settings.

pub mod loader;
pub mod schema;

pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{AccordConfig, LogFormat, LogLevel, LoggingConfig};
