//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Static risk classification of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Executed without asking (e.g., read_file, list_directory)
    Safe,
    /// Requires explicit user confirmation (e.g., write_file, execute_command)
    NeedsApproval,
}

impl RiskTier {
    pub fn as_str(&self) -> &str {
        match self {
            RiskTier::Safe => "safe",
            RiskTier::NeedsApproval => "needs_approval",
        }
    }

    pub fn requires_approval(&self) -> bool {
        matches!(self, RiskTier::NeedsApproval)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a tool that the model may invoke
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "read_file")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Risk tier of this tool
    pub risk_tier: RiskTier,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "path", "number")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        risk_tier: RiskTier,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            risk_tier,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_risk_tier(mut self, risk_tier: RiskTier) -> Self {
        self.risk_tier = risk_tier;
        self
    }

    pub fn requires_approval(&self) -> bool {
        self.risk_tier.requires_approval()
    }

    /// One-line signature for prompts, e.g. `read_file(path, offset?, limit?)`
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| {
                if p.required {
                    p.name.clone()
                } else {
                    format!("{}?", p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Registry of available tools, keyed by name
///
/// Immutable once the registry has been assembled at startup.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: HashMap<String, ToolDefinition>,
    /// Alias → canonical name mapping (e.g. "bash" → "execute_command")
    aliases: HashMap<String, String>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    /// Register a single alias mapping (builder pattern)
    pub fn register_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    /// Register multiple aliases at once (builder pattern)
    pub fn register_aliases(
        mut self,
        mappings: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        for (alias, canonical) in mappings {
            self.aliases.insert(alias.into(), canonical.into());
        }
        self
    }

    /// Override the risk tier of a registered tool. Unknown names are ignored.
    pub fn override_tier(mut self, name: &str, tier: RiskTier) -> Self {
        if let Some(tool) = self.tools.get_mut(name) {
            tool.risk_tier = tier;
        }
        self
    }

    /// Resolve a name: returns canonical name if it's a registered tool,
    /// or resolves alias, or None if unknown
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.tools.contains_key(name) {
            Some(name)
        } else {
            self.aliases
                .get(name)
                .map(|s| s.as_str())
                .filter(|canonical| self.tools.contains_key(*canonical))
        }
    }

    /// Get tool definition by canonical name or alias
    pub fn get_resolved(&self, name: &str) -> Option<&ToolDefinition> {
        self.resolve(name).and_then(|canonical| self.tools.get(canonical))
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Risk tier for a tool, `None` when the name is not registered
    pub fn risk_tier(&self, name: &str) -> Option<RiskTier> {
        self.get_resolved(name).map(|t| t.risk_tier)
    }

    /// All definitions sorted by name (stable ordering for prompts)
    pub fn sorted(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A request from the model to run a tool
///
/// Deserializes directly from the wire form `{"name": ..., "arguments": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional i64 argument (numeric strings are accepted)
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.arguments.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get an optional bool argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(|v| v.as_bool())
    }

    /// Human-readable `key=value` rendering of the arguments
    pub fn render_arguments(&self) -> String {
        let mut entries: Vec<_> = self.arguments.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tier() {
        assert!(!RiskTier::Safe.requires_approval());
        assert!(RiskTier::NeedsApproval.requires_approval());
        assert_eq!(RiskTier::NeedsApproval.to_string(), "needs_approval");
    }

    #[test]
    fn test_tool_definition_signature() {
        let tool = ToolDefinition::new("read_file", "Read file contents", RiskTier::Safe)
            .with_parameter(ToolParameter::new("path", "File path", true).with_type("path"))
            .with_parameter(ToolParameter::new("limit", "Max lines", false).with_type("number"));

        assert_eq!(tool.signature(), "read_file(path, limit?)");
        assert!(!tool.requires_approval());
    }

    #[test]
    fn test_tool_spec_tiers() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("read_file", "Read file", RiskTier::Safe))
            .register(ToolDefinition::new("write_file", "Write file", RiskTier::NeedsApproval));

        assert_eq!(spec.risk_tier("read_file"), Some(RiskTier::Safe));
        assert_eq!(spec.risk_tier("write_file"), Some(RiskTier::NeedsApproval));
        assert_eq!(spec.risk_tier("unknown"), None);
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_tool_spec_aliases() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("execute_command", "Run", RiskTier::NeedsApproval))
            .register_aliases([("bash", "execute_command"), ("shell", "execute_command")])
            .register_alias("ghost", "missing_tool");

        assert_eq!(spec.resolve("bash"), Some("execute_command"));
        assert_eq!(spec.resolve("execute_command"), Some("execute_command"));
        assert_eq!(spec.resolve("ghost"), None);
        assert_eq!(spec.risk_tier("shell"), Some(RiskTier::NeedsApproval));
        // exact lookup ignores aliases
        assert!(spec.get("bash").is_none());
    }

    #[test]
    fn test_override_tier() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("list_directory", "List", RiskTier::Safe))
            .override_tier("list_directory", RiskTier::NeedsApproval)
            .override_tier("nope", RiskTier::Safe);

        assert_eq!(spec.risk_tier("list_directory"), Some(RiskTier::NeedsApproval));
        assert!(spec.get("nope").is_none());
    }

    #[test]
    fn test_sorted_is_stable() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("b", "", RiskTier::Safe))
            .register(ToolDefinition::new("a", "", RiskTier::Safe));
        let names: Vec<_> = spec.sorted().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_tool_call_wire_format() {
        let call: ToolCall =
            serde_json::from_str(r#"{"name":"read_file","arguments":{"path":"foo.txt"}}"#).unwrap();
        assert_eq!(call.name, "read_file");
        assert_eq!(call.get_string("path"), Some("foo.txt"));

        let bare: ToolCall = serde_json::from_str(r#"{"name":"system_info"}"#).unwrap();
        assert!(bare.arguments.is_empty());
    }

    #[test]
    fn test_tool_call_accessors() {
        let call = ToolCall::new("execute_command")
            .with_arg("command", "ls")
            .with_arg("timeout", "15")
            .with_arg("force", true);

        assert_eq!(call.require_string("command").unwrap(), "ls");
        assert!(call.require_string("missing").is_err());
        assert_eq!(call.get_i64("timeout"), Some(15));
        assert_eq!(call.get_bool("force"), Some(true));
        assert_eq!(call.render_arguments(), "command=ls, force=true, timeout=15");
    }
}
