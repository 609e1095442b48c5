//! Options steering the traversal itself.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How much detail diagnostic dumps carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugLevel {
    #[default]
    Sparse,
    Medium,
    Full,
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sparse => "sparse",
            Self::Medium => "medium",
            Self::Full => "full",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuilderOptions {
    /// Reject functions, enums and enumerators marked deprecated.
    #[serde(default)]
    pub skip_deprecated: bool,

    /// Apply the event-system handling: meta-object plumbing is skipped and
    /// the trailing private-signal marker argument is stripped.
    #[serde(default)]
    pub extension_mode: bool,

    /// Include directories. Only used to shorten file names in diagnostics.
    #[serde(default)]
    pub header_paths: Vec<PathBuf>,

    #[serde(default)]
    pub debug_level: DebugLevel,

    /// Keep the input code model after the run instead of dropping it.
    #[serde(default)]
    pub keep_code_model: bool,
}

impl BuilderOptions {
    /// `file` relative to the first header path containing it.
    #[must_use]
    pub fn relative_header<'a>(&self, file: &'a str) -> &'a str {
        let path = Path::new(file);
        self.header_paths
            .iter()
            .find_map(|dir| path.strip_prefix(dir).ok())
            .and_then(Path::to_str)
            .unwrap_or(file)
    }
}
