//! Tool Registry
//!
//! The [`ToolRegistry`] aggregates multiple tool providers and implements
//! [`ToolExecutorPort`]. It handles tool discovery, provider resolution,
//! argument validation and execution routing based on priority.
//!
//! # Usage
//!
//! ```ignore
//! use toolgate_infrastructure::tools::{BuiltinProvider, JsonRpcToolProvider, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new()
//!     .register(JsonRpcToolProvider::new(config))   // priority: 100
//!     .register(BuiltinProvider::new("."));          // priority: -100
//!
//! registry.discover().await;
//!
//! let call = ToolCall::new("read_file").with_arg("path", "README.md");
//! let result = registry.execute(&call).await;
//! ```
//!
//! # Discovery Process
//!
//! 1. Providers are sorted by priority (highest first)
//! 2. Each available provider's `discover_tools()` is called
//! 3. Tools are registered, with higher-priority providers winning conflicts
//! 4. Tier overrides from the configuration are applied to the merged spec

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use toolgate_application::ports::tool_executor::ToolExecutorPort;
use toolgate_domain::tool::{
    DefaultToolValidator, ToolValidator,
    entities::{RiskTier, ToolCall, ToolSpec},
    provider::ToolProvider,
    value_objects::{ToolError, ToolResult},
};

/// Names the model commonly uses for the builtin tools
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("bash", "execute_command"),
    ("shell", "execute_command"),
    ("run_command", "execute_command"),
    ("cat", "read_file"),
    ("ls", "list_directory"),
];

/// Tool registry that aggregates multiple providers
pub struct ToolRegistry {
    /// Registered providers
    providers: Vec<Arc<dyn ToolProvider>>,
    /// Tool name -> provider ID mapping (cached after discovery)
    tool_mapping: HashMap<String, String>,
    /// Merged tool specification
    tool_spec: ToolSpec,
    /// Tools forced to the safe tier
    auto_approve: Vec<String>,
    /// Tools forced to the needs-approval tier
    approval_required: Vec<String>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            tool_mapping: HashMap::new(),
            tool_spec: ToolSpec::new(),
            auto_approve: Vec::new(),
            approval_required: Vec::new(),
        }
    }

    /// Register a tool provider
    pub fn register<P: ToolProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Register a tool provider (Arc version)
    pub fn register_arc(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Force risk tiers after discovery.
    ///
    /// `approval_required` wins when a tool appears in both lists.
    pub fn with_tier_overrides(
        mut self,
        auto_approve: impl IntoIterator<Item = impl Into<String>>,
        approval_required: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.auto_approve = auto_approve.into_iter().map(Into::into).collect();
        self.approval_required = approval_required.into_iter().map(Into::into).collect();
        self
    }

    /// Discover tools from all providers
    ///
    /// Must be called before the registry can execute anything. A provider
    /// that is unavailable or fails discovery contributes no tools.
    pub async fn discover(&mut self) {
        self.providers
            .sort_by_key(|p| std::cmp::Reverse(p.priority()));

        let mut tool_spec = ToolSpec::new();
        let mut tool_mapping = HashMap::new();

        for provider in &self.providers {
            if !provider.is_available().await {
                tracing::debug!(provider = provider.id(), "Provider not available, skipping");
                continue;
            }

            match provider.discover_tools().await {
                Ok(tools) => {
                    for tool in tools {
                        if !tool_mapping.contains_key(&tool.name) {
                            tracing::debug!(
                                tool = %tool.name,
                                provider = provider.id(),
                                tier = %tool.risk_tier,
                                "Registered tool"
                            );
                            tool_mapping.insert(tool.name.clone(), provider.id().to_string());
                            tool_spec = tool_spec.register(tool);
                        } else {
                            tracing::trace!(
                                tool = %tool.name,
                                provider = provider.id(),
                                "Tool already registered by higher priority provider"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.id(),
                        error = %e,
                        "Failed to discover tools from provider"
                    );
                }
            }
        }

        for name in &self.auto_approve {
            tool_spec = tool_spec.override_tier(name, RiskTier::Safe);
        }
        for name in &self.approval_required {
            tool_spec = tool_spec.override_tier(name, RiskTier::NeedsApproval);
        }
        tool_spec = tool_spec.register_aliases(DEFAULT_ALIASES.iter().copied());

        tracing::info!(
            tools = tool_mapping.len(),
            providers = self.providers.len(),
            "Tool discovery finished"
        );

        self.tool_spec = tool_spec;
        self.tool_mapping = tool_mapping;
    }

    /// Get the provider for a specific tool
    fn provider_for(&self, tool_name: &str) -> Option<&Arc<dyn ToolProvider>> {
        let provider_id = self.tool_mapping.get(tool_name)?;
        self.providers.iter().find(|p| p.id() == provider_id)
    }

    /// Get a list of registered provider IDs
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Get statistics about registered tools
    pub fn stats(&self) -> RegistryStats {
        let mut tools_per_provider = HashMap::new();
        for provider_id in self.tool_mapping.values() {
            *tools_per_provider.entry(provider_id.clone()).or_insert(0) += 1;
        }

        RegistryStats {
            total_providers: self.providers.len(),
            total_tools: self.tool_mapping.len(),
            tools_per_provider,
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub total_providers: usize,
    pub total_tools: usize,
    pub tools_per_provider: HashMap<String, usize>,
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(definition) = self.tool_spec.get_resolved(&call.name) else {
            return ToolResult::failure(&call.name, ToolError::unknown_tool(&call.name));
        };

        if let Err(e) = DefaultToolValidator.validate(call, definition) {
            return ToolResult::failure(&call.name, ToolError::invalid_argument(e));
        }

        let Some(provider) = self.provider_for(&definition.name) else {
            return ToolResult::failure(&call.name, ToolError::unknown_tool(&call.name));
        };

        let canonical = if definition.name == call.name {
            call.clone()
        } else {
            ToolCall::new(&definition.name).with_arguments(call.arguments.clone())
        };

        match AssertUnwindSafe(provider.execute(&canonical))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(tool = %canonical.name, provider = provider.id(), "Tool handler panicked");
                ToolResult::failure(
                    &canonical.name,
                    ToolError::execution_failed(format!("Tool '{}' crashed", canonical.name)),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::BuiltinProvider;
    use toolgate_domain::tool::{ProviderError, ToolDefinition, ToolParameter};

    struct FixedProvider {
        id: &'static str,
        priority: i32,
        output: &'static str,
    }

    #[async_trait]
    impl ToolProvider for FixedProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn display_name(&self) -> &str {
            self.id
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
            Ok(vec![
                ToolDefinition::new("read_file", "shadowing read", RiskTier::Safe)
                    .with_parameter(ToolParameter::new("path", "path", true)),
                ToolDefinition::new("explode", "panics", RiskTier::Safe),
            ])
        }

        async fn execute(&self, call: &ToolCall) -> ToolResult {
            if call.name == "explode" {
                panic!("boom");
            }
            ToolResult::success(&call.name, self.output)
        }
    }

    async fn builtin_registry(dir: &std::path::Path) -> ToolRegistry {
        let mut registry = ToolRegistry::new().register(BuiltinProvider::new(dir));
        registry.discover().await;
        registry
    }

    #[tokio::test]
    async fn test_registry_with_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let registry = builtin_registry(dir.path()).await;

        assert!(registry.has_tool("read_file"));
        assert!(registry.has_tool("write_file"));
        assert!(registry.has_tool("execute_command"));
        assert!(registry.has_tool("bash"));
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "registry test").unwrap();
        let registry = builtin_registry(dir.path()).await;

        let call = ToolCall::new("read_file").with_arg("path", "a.txt");
        let result = registry.execute(&call).await;

        assert!(result.is_success());
        assert!(result.text.contains("registry test"));
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let registry = builtin_registry(dir.path()).await;

        let result = registry.execute(&ToolCall::new("teleport")).await;

        assert!(result.is_error);
        assert_eq!(result.error_code.as_deref(), Some("UNKNOWN_TOOL"));
        assert!(result.text.contains("Unknown tool: teleport"));
    }

    #[tokio::test]
    async fn test_registry_not_discovered_knows_no_tools() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::new().register(BuiltinProvider::new(dir.path()));

        let call = ToolCall::new("read_file").with_arg("path", "a.txt");
        let result = registry.execute(&call).await;

        assert_eq!(result.error_code.as_deref(), Some("UNKNOWN_TOOL"));
    }

    #[tokio::test]
    async fn test_registry_validates_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let registry = builtin_registry(dir.path()).await;

        let result = registry.execute(&ToolCall::new("read_file")).await;

        assert_eq!(result.error_code.as_deref(), Some("INVALID_ARGUMENT"));
        assert!(result.text.contains("Missing required parameter 'path'"));
    }

    #[tokio::test]
    async fn test_registry_resolves_alias() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "via alias").unwrap();
        let registry = builtin_registry(dir.path()).await;

        let result = registry
            .execute(&ToolCall::new("cat").with_arg("path", "a.txt"))
            .await;

        assert_eq!(result.tool_name, "read_file");
        assert_eq!(result.text, "via alias");
    }

    #[tokio::test]
    async fn test_higher_priority_provider_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ToolRegistry::new()
            .register(BuiltinProvider::new(dir.path()))
            .register(FixedProvider {
                id: "remote",
                priority: 100,
                output: "from remote",
            });
        registry.discover().await;

        let result = registry
            .execute(&ToolCall::new("read_file").with_arg("path", "a.txt"))
            .await;
        assert_eq!(result.text, "from remote");

        let stats = registry.stats();
        assert_eq!(stats.total_providers, 2);
        assert_eq!(stats.total_tools, 6);
        assert_eq!(stats.tools_per_provider.get("remote"), Some(&2));
        assert_eq!(registry.provider_ids(), vec!["remote", "builtin"]);
    }

    #[tokio::test]
    async fn test_panicking_tool_becomes_error_result() {
        let mut registry = ToolRegistry::new().register(FixedProvider {
            id: "remote",
            priority: 100,
            output: "",
        });
        registry.discover().await;

        let result = registry.execute(&ToolCall::new("explode")).await;

        assert!(result.is_error);
        assert_eq!(result.error_code.as_deref(), Some("EXECUTION_FAILED"));
    }

    #[tokio::test]
    async fn test_tier_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ToolRegistry::new()
            .register(BuiltinProvider::new(dir.path()))
            .with_tier_overrides(["write_file", "system_info"], ["system_info"]);
        registry.discover().await;

        let spec = registry.tool_spec();
        assert_eq!(spec.risk_tier("write_file"), Some(RiskTier::Safe));
        assert_eq!(spec.risk_tier("system_info"), Some(RiskTier::NeedsApproval));
        assert_eq!(spec.risk_tier("execute_command"), Some(RiskTier::NeedsApproval));
    }
}
