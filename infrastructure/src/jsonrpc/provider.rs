//! Tool provider backed by a JSON-RPC subprocess

use super::client::JsonRpcClient;
use super::error::McpError;
use super::protocol::{ToolsListResult, classify_tier, result_is_error, result_text};
use async_trait::async_trait;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use toolgate_domain::tool::{
    entities::{ToolCall, ToolDefinition},
    provider::{ProviderError, ToolProvider},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use tracing::{debug, warn};

/// Priority for the JSON-RPC provider (preferred over builtin tools)
pub const JSONRPC_PRIORITY: i32 = 100;

/// How to launch the tool server and classify its tools
#[derive(Debug, Clone)]
pub struct JsonRpcProviderConfig {
    pub command: String,
    pub args: Vec<String>,
    pub request_timeout: Duration,
    /// Tools forced to the safe tier
    pub auto_approve: Vec<String>,
    /// Tools forced to the needs-approval tier
    pub approval_required: Vec<String>,
}

impl JsonRpcProviderConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            request_timeout: Duration::from_secs(30),
            auto_approve: Vec::new(),
            approval_required: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_tiers(mut self, auto_approve: Vec<String>, approval_required: Vec<String>) -> Self {
        self.auto_approve = auto_approve;
        self.approval_required = approval_required;
        self
    }
}

/// Provider that forwards tool calls to a long-lived subprocess.
///
/// The process is spawned on first use and lives until the provider is
/// dropped.
pub struct JsonRpcToolProvider {
    config: JsonRpcProviderConfig,
    client: OnceCell<JsonRpcClient>,
}

impl JsonRpcToolProvider {
    pub fn new(config: JsonRpcProviderConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&JsonRpcClient, McpError> {
        self.client
            .get_or_try_init(|| async {
                JsonRpcClient::spawn(
                    &self.config.command,
                    &self.config.args,
                    self.config.request_timeout,
                )
            })
            .await
    }
}

#[async_trait]
impl ToolProvider for JsonRpcToolProvider {
    fn id(&self) -> &str {
        "jsonrpc"
    }

    fn display_name(&self) -> &str {
        "JSON-RPC Tool Server"
    }

    fn priority(&self) -> i32 {
        JSONRPC_PRIORITY
    }

    async fn is_available(&self) -> bool {
        which::which(&self.config.command).is_ok()
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        let client = self
            .client()
            .await
            .map_err(|e| ProviderError::NotAvailable(e.to_string()))?;

        let result = match client.request("tools/list", None).await {
            Ok(result) => result,
            Err(McpError::RpcError { message, .. }) => {
                warn!(error = %message, "Tool server does not list its tools");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ProviderError::DiscoveryFailed(e.to_string())),
        };

        let listed: ToolsListResult = serde_json::from_value(result)
            .map_err(|e| ProviderError::DiscoveryFailed(format!("Invalid tools/list result: {}", e)))?;

        let definitions: Vec<ToolDefinition> = listed
            .tools
            .into_iter()
            .map(|tool| {
                let tier = classify_tier(
                    &tool.name,
                    &self.config.auto_approve,
                    &self.config.approval_required,
                );
                tool.into_definition(tier)
            })
            .collect();
        debug!(count = definitions.len(), "Discovered remote tools");
        Ok(definitions)
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let start = Instant::now();

        let client = match self.client().await {
            Ok(client) => client,
            Err(e) => {
                return ToolResult::failure(&call.name, ToolError::execution_failed(e.to_string()));
            }
        };

        let params = json!({
            "name": call.name,
            "arguments": call.arguments,
        });
        let result = match client.request("tools/call", Some(params)).await {
            Ok(result) => result,
            Err(McpError::RpcError { message, .. }) => {
                return ToolResult::failure(&call.name, ToolError::execution_failed(message));
            }
            Err(McpError::Timeout(secs)) => {
                return ToolResult::failure(
                    &call.name,
                    ToolError::timeout(format!("{} after {} seconds", call.name, secs)),
                );
            }
            Err(e) => {
                return ToolResult::failure(&call.name, ToolError::execution_failed(e.to_string()));
            }
        };

        let text = result_text(&result);
        if result_is_error(&result) {
            return ToolResult::failure(&call.name, ToolError::execution_failed(text));
        }

        let bytes = text.len();
        ToolResult::success(&call.name, text).with_metadata(ToolResultMetadata {
            duration_ms: Some(start.elapsed().as_millis() as u64),
            bytes: Some(bytes),
            ..Default::default()
        })
    }
}
