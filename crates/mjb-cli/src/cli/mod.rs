use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod global;

pub use global::{DebugLevelArg, OutputFormat};

/// Top-level CLI parser for the `mjb` binary.
#[derive(Debug, Parser)]
#[command(name = "mjb", version, about = "Build a binding meta model from a code model and a ruleset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the builder and print a summary of the resulting model.
    Build(BuildArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Code model document (.json or .toml)
    pub code_model: PathBuf,

    /// Ruleset document (.json or .toml)
    pub ruleset: PathBuf,

    #[command(flatten)]
    pub config: ConfigFlags,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub config: ConfigFlags,
}

/// Flags layered over the file and environment configuration.
#[derive(Debug, Default, Args)]
pub struct ConfigFlags {
    /// Reject deprecated functions and enums
    #[arg(long)]
    pub skip_deprecated: bool,

    /// Enable event-system name exclusions and private-signal handling
    #[arg(long)]
    pub extension_mode: bool,

    /// Include directory used to shorten file names in diagnostics (repeatable)
    #[arg(long = "header-path", value_name = "DIR")]
    pub header_paths: Vec<PathBuf>,

    /// Detail of diagnostic dumps
    #[arg(long, value_enum)]
    pub debug_level: Option<DebugLevelArg>,

    /// Directory receiving the reject logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Do not write reject logs
    #[arg(long)]
    pub no_reject_logs: bool,
}
