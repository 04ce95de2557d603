//! REPL configuration from TOML (`[repl]` section)

use serde::{Deserialize, Serialize};

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Path to history file
    pub history_file: Option<String>,
    /// Show the model's `<think>` block
    pub show_thinking: bool,
    /// Echo tokens while the model is generating
    pub show_stream: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            show_thinking: true,
            show_stream: false,
            show_progress: true,
        }
    }
}
