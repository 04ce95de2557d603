//! Built-in tool provider
//!
//! Provides the local tools (files, directories, system info, shell
//! commands). Every path is confined to the provider's [`Workspace`].

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use toolgate_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    provider::{ProviderError, ToolProvider},
    value_objects::{ToolError, ToolResult},
};

use crate::tools::command::{self, DEFAULT_COMMAND_TIMEOUT};
use crate::tools::workspace::Workspace;
use crate::tools::{directory, file, system};

/// Priority for the built-in provider (lowest, used as fallback)
pub const BUILTIN_PRIORITY: i32 = -100;

/// Built-in tool provider
#[derive(Debug, Clone)]
pub struct BuiltinProvider {
    tool_spec: ToolSpec,
    workspace: Workspace,
    command_timeout: Duration,
}

impl BuiltinProvider {
    /// Create a provider with all builtin tools, confined to `workspace_root`
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            tool_spec: crate::tools::default_tool_spec(),
            workspace: Workspace::new(workspace_root),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Create a provider with only the safe (read-only) tools
    pub fn read_only(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            tool_spec: crate::tools::read_only_tool_spec(),
            ..Self::new(workspace_root)
        }
    }

    /// Default timeout for `execute_command` when the call gives none
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}

#[async_trait]
impl ToolProvider for BuiltinProvider {
    fn id(&self) -> &str {
        "builtin"
    }

    fn display_name(&self) -> &str {
        "Built-in Tools"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(self.tool_spec.all().cloned().collect())
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        if self.tool_spec.get(&call.name).is_none() {
            return ToolResult::failure(&call.name, ToolError::unknown_tool(&call.name));
        }

        match call.name.as_str() {
            file::READ_FILE => file::execute_read_file(&self.workspace, call),
            file::WRITE_FILE => file::execute_write_file(&self.workspace, call),
            directory::LIST_DIRECTORY => directory::execute_list_directory(&self.workspace, call),
            system::SYSTEM_INFO => system::execute_system_info(call),
            command::EXECUTE_COMMAND => {
                command::execute_command(&self.workspace, call, self.command_timeout).await
            }
            _ => ToolResult::failure(&call.name, ToolError::unknown_tool(&call.name)),
        }
    }
}
