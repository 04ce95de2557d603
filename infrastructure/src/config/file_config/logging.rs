//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write the JSONL conversation log
    pub conversation_log: bool,
    /// Also write diagnostics to a daily rolling file
    pub file: bool,
    /// Directory for log files (default: the platform data directory)
    pub dir: Option<String>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            conversation_log: true,
            file: false,
            dir: None,
        }
    }
}
