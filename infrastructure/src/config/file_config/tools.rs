//! Tools configuration from TOML (`[tools]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [tools]
//! builtin = true
//! workspace_root = "."
//! auto_approve = ["list_notes"]
//! denied = ["execute_command"]
//!
//! [tools.jsonrpc]
//! enabled = true
//! command = "node"
//! args = ["server.js"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::jsonrpc::JsonRpcProviderConfig;

/// Raw tools configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Register the builtin local tools
    pub builtin: bool,
    /// Directory the builtin tools are confined to
    pub workspace_root: String,
    /// Default timeout for `execute_command`
    pub command_timeout_seconds: u64,
    /// Tools forced to the safe tier
    pub auto_approve: Vec<String>,
    /// Tools forced to the needs-approval tier
    pub approval_required: Vec<String>,
    /// Tools that are always refused
    pub denied: Vec<String>,
    /// External tool server
    pub jsonrpc: FileJsonRpcConfig,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            workspace_root: ".".to_string(),
            command_timeout_seconds: 30,
            auto_approve: Vec::new(),
            approval_required: Vec::new(),
            denied: Vec::new(),
            jsonrpc: FileJsonRpcConfig::default(),
        }
    }
}

impl FileToolsConfig {
    pub fn workspace_root(&self) -> PathBuf {
        PathBuf::from(&self.workspace_root)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }

    /// Provider settings for the tool server, `None` when it is disabled
    pub fn jsonrpc_provider_config(&self) -> Option<JsonRpcProviderConfig> {
        if !self.jsonrpc.enabled {
            return None;
        }
        Some(
            JsonRpcProviderConfig::new(self.jsonrpc.command.as_str())
                .with_args(self.jsonrpc.args.clone())
                .with_request_timeout(Duration::from_secs(self.jsonrpc.request_timeout_seconds))
                .with_tiers(self.auto_approve.clone(), self.approval_required.clone()),
        )
    }
}

/// `[tools.jsonrpc]`: line-based JSON-RPC tool subprocess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileJsonRpcConfig {
    pub enabled: bool,
    pub command: String,
    pub args: Vec<String>,
    pub request_timeout_seconds: u64,
}

impl Default for FileJsonRpcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "node".to_string(),
            args: vec!["server.js".to_string()],
            request_timeout_seconds: 30,
        }
    }
}
