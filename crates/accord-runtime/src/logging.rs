//! Logging setup over `tracing` and `tracing-subscriber`.
//!
//! # Configuration-Based Initialization
//!
//! ```rust,ignore
//! use accord_runtime::config::load_config;
//! use accord_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! # Manual Initialization
//!
//! ```rust,ignore
//! use accord_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::new()
//!     .directive("accord_framework=debug")
//!     .init();
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize logging from a [`LoggingConfig`].
///
/// Safe to call more than once; repeated initialization is ignored.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// A builder for configuring logging.
#[derive(Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    level: Option<tracing::Level>,
    format: LogFormat,
    with_target: bool,
    with_thread_ids: bool,
    with_file: bool,
    with_line_number: bool,
}

impl LoggingBuilder {
    /// Create a new logging builder.
    pub fn new() -> Self {
        Self {
            with_target: true,
            ..Default::default()
        }
    }

    /// Create a builder from a [`LoggingConfig`].
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::new();
        builder.level = Some(config.level.to_tracing_level());
        builder.format = config.format;
        builder.with_thread_ids = config.thread_ids;
        builder.with_file = config.file_location;
        builder.with_line_number = config.file_location;
        for (module, level) in &config.filters {
            builder.directives.push(format!("{module}={level}"));
        }
        builder
    }

    /// Set the global log level.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Add a filter directive, e.g. `accord_framework=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Set the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Include the target (module path) in log output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Include thread IDs in log output.
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Include file names and line numbers in log output.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self.with_line_number = enabled;
        self
    }

    /// Build the filter from the level and directives.
    ///
    /// `RUST_LOG`, when set, takes precedence over the configured level.
    fn build_filter(&self) -> EnvFilter {
        let base_level = self.level.unwrap_or(tracing::Level::INFO);
        let base_filter = base_level.to_string().to_lowercase();

        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base_filter));

        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }

        filter
    }

    /// Initialize the logging system.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Try to initialize the logging system, returning an error on failure.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();

        macro_rules! configure_layer {
            ($layer:expr) => {
                $layer
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids)
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
            };
        }

        match self.format {
            #[cfg(feature = "json-log")]
            LogFormat::Json => {
                let layer = fmt::layer().json();
                tracing_subscriber::registry()
                    .with(layer)
                    .with(filter)
                    .try_init()
            }
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => {
                let layer = configure_layer!(fmt::layer().compact());
                tracing_subscriber::registry()
                    .with(layer)
                    .with(filter)
                    .try_init()
            }
            LogFormat::Compact => {
                let layer = configure_layer!(fmt::layer().compact());
                tracing_subscriber::registry()
                    .with(layer)
                    .with(filter)
                    .try_init()
            }
            LogFormat::Full => {
                let layer = configure_layer!(fmt::layer());
                tracing_subscriber::registry()
                    .with(layer)
                    .with(filter)
                    .try_init()
            }
            LogFormat::Pretty => {
                let layer = configure_layer!(fmt::layer().pretty());
                tracing_subscriber::registry()
                    .with(layer)
                    .with(filter)
                    .try_init()
            }
        }
    }
}
