//! Infrastructure layer for toolgate
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Ollama chat backend, the tool providers
//! and registry, configuration file loading and the conversation log.

pub mod config;
pub mod jsonrpc;
pub mod logging;
pub mod ollama;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig, FileLoggingConfig,
    FileModelConfig, FilePersonaConfig, FileReplConfig, FileToolsConfig,
};
pub use jsonrpc::{JsonRpcProviderConfig, JsonRpcToolProvider, McpError};
pub use logging::JsonlConversationLogger;
pub use ollama::{OllamaError, OllamaGateway};
pub use tools::{
    BuiltinProvider, RegistryStats, ToolRegistry, Workspace, default_tool_spec,
    read_only_tool_spec,
};
