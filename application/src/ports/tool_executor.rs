//! Tool Executor port
//!
//! Defines the interface for executing tools requested by the model.

use async_trait::async_trait;
use toolgate_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResult,
};

/// Port for tool execution
///
/// Implementations never fail with `Err`: unknown tools, invalid arguments,
/// handler errors and panics all come back as an error-flagged
/// [`ToolResult`]. The registry behind this port is read-only after
/// startup and shared by every conversation.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool (or alias) is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get_resolved(name).is_some()
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get_resolved(name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Execute a tool call
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}
