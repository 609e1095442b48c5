use std::path::PathBuf;

use anyhow::Context;
use figment::{Figment, providers::Serialized};
use mjb_config::{BuilderConfig, DebugLevel};
use serde::Serialize;

use crate::cli::ConfigFlags;

pub mod build;
pub mod config;

/// Load the layered configuration with command-line flags on top.
pub fn resolve_config(flags: &ConfigFlags) -> anyhow::Result<BuilderConfig> {
    let figment = flags.merge_into(BuilderConfig::figment());
    BuilderConfig::from_figment(&figment).context("failed to load builder configuration")
}

impl ConfigFlags {
    /// Merge the flags that were given; absent flags leave lower layers alone.
    pub fn merge_into(&self, figment: Figment) -> Figment {
        figment.merge(Serialized::defaults(self.overrides()))
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            builder: BuilderOverrides {
                skip_deprecated: self.skip_deprecated.then_some(true),
                extension_mode: self.extension_mode.then_some(true),
                header_paths: (!self.header_paths.is_empty()).then(|| self.header_paths.clone()),
                debug_level: self.debug_level.map(DebugLevel::from),
            },
            output: OutputOverrides {
                log_directory: self.log_dir.clone(),
                write_reject_logs: self.no_reject_logs.then_some(false),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Overrides {
    builder: BuilderOverrides,
    output: OutputOverrides,
}

#[derive(Debug, Serialize)]
struct BuilderOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extension_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_paths: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_level: Option<DebugLevel>,
}

#[derive(Debug, Serialize)]
struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    log_directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    write_reject_logs: Option<bool>,
}
