use clap::ValueEnum;
use mjb_config::DebugLevel;

/// Output format for command results.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
}

/// `--debug-level` values, mirrored onto [`DebugLevel`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum DebugLevelArg {
    Sparse,
    Medium,
    Full,
}

impl From<DebugLevelArg> for DebugLevel {
    fn from(value: DebugLevelArg) -> Self {
        match value {
            DebugLevelArg::Sparse => Self::Sparse,
            DebugLevelArg::Medium => Self::Medium,
            DebugLevelArg::Full => Self::Full,
        }
    }
}
