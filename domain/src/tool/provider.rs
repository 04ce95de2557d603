//! Tool provider abstraction
//!
//! A [`ToolProvider`] is a source of tools that can be plugged into the tool
//! registry. The registry merges providers by priority:
//!
//! ```text
//!              ┌──────────────────────────────┐
//!              │         ToolRegistry         │
//!              │ (merges specs, routes calls) │
//!              └──────────────────────────────┘
//!                     │                │
//!                     ▼                ▼
//!             ┌──────────────┐  ┌──────────────┐
//!             │   JSON-RPC   │  │   Builtin    │
//!             │  subprocess  │  │ local tools  │
//!             └──────────────┘  └──────────────┘
//!              priority: 100     priority: -100
//! ```
//!
//! When two providers offer the same tool name, the higher priority wins.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::ToolResult;

/// Error type for tool provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider is not available (e.g., subprocess command not installed)
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Failed to discover tools from the provider
    #[error("Discovery failed: {0}")]
    DiscoveryFailed(String),

    /// Tool not found in this provider
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Tool provider abstraction - external source of tools
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Unique identifier for this provider (e.g. "builtin", "jsonrpc")
    fn id(&self) -> &str;

    /// Display name for user-facing output
    fn display_name(&self) -> &str;

    /// Priority for tool resolution (higher = preferred)
    fn priority(&self) -> i32 {
        0
    }

    /// Check if the provider is available and properly configured
    async fn is_available(&self) -> bool;

    /// Discover available tools from this provider
    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError>;

    /// Execute a tool call
    ///
    /// The name in the call must match one of the tools
    /// returned by `discover_tools()`.
    async fn execute(&self, call: &ToolCall) -> ToolResult;

    /// Check if this provider has a specific tool
    async fn has_tool(&self, tool_name: &str) -> bool {
        match self.discover_tools().await {
            Ok(tools) => tools.iter().any(|t| t.name == tool_name),
            Err(_) => false,
        }
    }
}
