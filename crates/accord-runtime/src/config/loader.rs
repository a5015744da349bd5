//! Configuration loader using figment.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`accord.{profile}.toml`)
//! 3. Main config file (`accord.toml` / `config.toml`)
//! 4. Environment variables (`ACCORD_*`)
//! 5. Programmatic overrides via [`ConfigLoader::merge`]
//!
//! Environment variables use the `ACCORD_` prefix with `__` as the nesting
//! separator:
//!
//! - `ACCORD_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `ACCORD_ACCESS__DENY_GUILDS=["G1"]` → `access.deny_guilds = ["G1"]`
//!
//! # Example
//!
//! ```rust,ignore
//! use accord_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/accord.toml")
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use tracing::{debug, info, trace, warn};

use super::schema::AccordConfig;
use crate::error::{ConfigError, ConfigResult};

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Creates a profile from the `ACCORD_PROFILE` variable, defaulting to
    /// development.
    pub fn from_env() -> Self {
        std::env::var("ACCORD_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: AccordConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<AccordConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: AccordConfig = figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(AccordConfig::default()));

        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = figment.merge(Toml::file(path));
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with ACCORD_ prefix");
            figment = figment.merge(
                Env::prefixed("ACCORD_")
                    .split("__")
                    .map(|key| key.as_str().replace("__", ".").into()),
            );
        }

        Ok(figment)
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("accord"));
        }
        paths
    }

    /// Searches for and loads configuration files from search paths.
    ///
    /// A profile-specific variant is merged before the base file of the same
    /// name; the search stops at the first directory holding a base file.
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            for base_name in ["accord.toml", "config.toml"] {
                let stem = base_name.trim_end_matches(".toml");
                let profile_path =
                    search_path.join(format!("{stem}.{}.toml", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = figment.merge(Toml::file(&profile_path));
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    return figment.merge(Toml::file(&base_path));
                }
            }
        }
        warn!("No configuration file found, using defaults");
        figment
    }
}

/// Loads configuration from default locations.
pub fn load_config() -> ConfigResult<AccordConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<AccordConfig> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, LogLevel};

    #[test]
    fn defaults_load_without_any_source() {
        let config = ConfigLoader::new().without_env().load().unwrap();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.access.channels.is_empty());
        assert!(config.access.allow_guilds.is_empty());
        assert!(config.access.deny_guilds.is_empty());
    }

    #[test]
    fn file_and_env_layers_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "accord.toml",
                r#"
                    [logging]
                    level = "debug"

                    [access]
                    deny_guilds = ["G9"]

                    [[access.channels]]
                    command_name = "ban"
                    channels = ["C1"]
                "#,
            )?;
            jail.set_env("ACCORD_LOGGING__LEVEL", "warn");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .expect("config loads");

            // env beats file, file beats defaults
            assert_eq!(config.logging.level, LogLevel::Warn);
            assert_eq!(config.access.deny_guilds, vec!["G9".to_string()]);
            assert_eq!(config.access.channels.len(), 1);
            assert_eq!(config.access.channels[0].command_name, "ban");
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = ConfigLoader::new()
            .without_env()
            .file("/nonexistent/accord.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
