//! Errors raised while resolving the builder configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer (defaults, TOML file or `MJB_*` variable) failed to parse or merge.
    #[error("cannot resolve builder configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("reject logs are enabled but output.log_directory is empty")]
    EmptyLogDirectory,
}
