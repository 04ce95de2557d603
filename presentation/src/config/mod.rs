//! Presentation-level configuration
//!
//! Configuration for console output and REPL behavior.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Show progress indicators
    pub show_progress: bool,
    /// Show `<think>` content extracted from replies
    pub show_thinking: bool,
    /// Echo model tokens while they stream
    pub show_stream: bool,
    /// Path to history file
    pub history_file: Option<PathBuf>,
}

impl ReplConfig {
    /// History file to use: the configured one, or `<data dir>/toolgate/history.txt`
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("toolgate").join("history.txt")))
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            show_thinking: true,
            show_stream: false,
            history_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_history_file_wins() {
        let config = ReplConfig {
            history_file: Some(PathBuf::from("/tmp/h.txt")),
            ..Default::default()
        };
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/h.txt")));
    }
}
