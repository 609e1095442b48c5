//! # mjb-config
//!
//! Layered configuration loading for the meta model builder using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MJB_*` prefix, `__` as separator)
//! 2. Project-level `.mjb/config.toml`
//! 3. User-level `~/.config/mjb/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `MJB_BUILDER__SKIP_DEPRECATED` -> `builder.skip_deprecated`,
//! `MJB_OUTPUT__LOG_DIRECTORY` -> `output.log_directory`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use mjb_config::BuilderConfig;
//!
//! let config = BuilderConfig::load().expect("config");
//! if config.output.write_reject_logs {
//!     println!("logs go to {}", config.output.log_directory.display());
//! }
//! ```

mod builder;
mod error;
mod output;

pub use builder::{BuilderOptions, DebugLevel};
pub use error::ConfigError;
pub use output::OutputOptions;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub builder: BuilderOptions,
    #[serde(default)]
    pub output: OutputOptions,
}

impl BuilderConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables (`MJB_*` prefix)
    /// 2. `.mjb/config.toml` (project-local)
    /// 3. `~/.config/mjb/config.toml` (user-global)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Extract and validate from an arbitrary figment.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can merge additional providers (CLI flags) on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".mjb/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("MJB_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mjb").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.output.write_reject_logs && self.output.log_directory.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLogDirectory);
        }
        Ok(())
    }
}
