//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types
//! (`ReasoningParams`, `GenerationOptions`, provider configs) at wiring time.

mod agent;
mod logging;
mod model;
mod persona;
mod repl;
mod tools;

pub use agent::FileAgentConfig;
pub use logging::FileLoggingConfig;
pub use model::FileModelConfig;
pub use persona::FilePersonaConfig;
pub use repl::FileReplConfig;
pub use tools::{FileJsonRpcConfig, FileToolsConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toolgate_application::ReasoningParams;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("model.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("agent.max_iterations must be at least 1")]
    InvalidMaxIterations,

    #[error("tools.jsonrpc.command cannot be empty when the tool server is enabled")]
    EmptyToolServerCommand,

    #[error("tools.jsonrpc.request_timeout_seconds cannot be 0")]
    InvalidToolServerTimeout,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat model backend
    pub model: FileModelConfig,
    /// Assistant persona
    pub persona: FilePersonaConfig,
    /// Reasoning loop settings
    pub agent: FileAgentConfig,
    /// Tool providers and permissions
    pub tools: FileToolsConfig,
    /// Log outputs
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.model.name.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyModelName);
        }
        if self.model.timeout_seconds == 0 {
            errors.push(ConfigValidationError::InvalidTimeout);
        }
        if self.agent.max_iterations == 0 {
            errors.push(ConfigValidationError::InvalidMaxIterations);
        }
        if self.tools.jsonrpc.enabled {
            if self.tools.jsonrpc.command.trim().is_empty() {
                errors.push(ConfigValidationError::EmptyToolServerCommand);
            }
            if self.tools.jsonrpc.request_timeout_seconds == 0 {
                errors.push(ConfigValidationError::InvalidToolServerTimeout);
            }
        }

        errors
    }

    /// Reasoning loop parameters assembled from `[model]` and `[agent]`
    pub fn reasoning_params(&self) -> ReasoningParams {
        ReasoningParams::default()
            .with_max_iterations(self.agent.max_iterations)
            .with_model_timeout(Some(self.model.timeout()))
            .with_stream(self.model.stream)
            .with_empty_response_fallback(self.agent.empty_response_fallback.as_str())
            .with_approval_timeout(Some(self.agent.approval_timeout()))
            .with_complexity(self.agent.complexity_policy())
            .with_error_indicators(self.agent.error_indicators.clone())
    }
}
