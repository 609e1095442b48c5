//! Where the reject logs go.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_log_directory() -> PathBuf {
    PathBuf::from(".")
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputOptions {
    /// Directory receiving the four `mjb_rejected_*.log` files.
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,

    #[serde(default = "default_true")]
    pub write_reject_logs: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            write_reject_logs: true,
        }
    }
}
