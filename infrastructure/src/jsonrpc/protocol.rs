//! Wire types for the line-based JSON-RPC tool protocol.
//!
//! Every request and response is a single JSON object on its own line.
//!
//! - `tools/list` → `{"tools": [{"name", "description", "inputSchema"}]}`
//! - `tools/call` with `{"name", "arguments"}` → a result object whose shape
//!   varies between servers (see [`result_text`])

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolgate_domain::tool::entities::{RiskTier, ToolDefinition, ToolParameter};

/// Name fragments that mark a remote tool as mutating
const MUTATING_NAME_PARTS: &[&str] = &["write", "delete", "execute", "run", "kill", "create", "move"];

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

/// Result of `tools/list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<RemoteTool>,
}

/// A tool advertised by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Option<Value>,
}

impl RemoteTool {
    /// Convert to a domain definition with the given tier.
    ///
    /// Parameters come from `inputSchema.properties`; `inputSchema.required`
    /// marks the required ones.
    pub fn into_definition(self, tier: RiskTier) -> ToolDefinition {
        let description = self
            .description
            .unwrap_or_else(|| format!("Remote tool {}", self.name));
        let mut definition = ToolDefinition::new(self.name, description, tier);

        let Some(schema) = self.input_schema else {
            return definition;
        };
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            let mut names: Vec<&String> = properties.keys().collect();
            names.sort();
            for name in names {
                let property = &properties[name];
                let param_description = property
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let mut param =
                    ToolParameter::new(name, param_description, required.contains(&name.as_str()));
                if let Some(param_type) = property.get("type").and_then(Value::as_str) {
                    param = param.with_type(param_type);
                }
                definition = definition.with_parameter(param);
            }
        }
        definition
    }
}

/// Decide the risk tier of a discovered tool.
///
/// Explicit configuration wins; otherwise the name decides.
pub fn classify_tier(name: &str, auto_approve: &[String], approval_required: &[String]) -> RiskTier {
    if approval_required.iter().any(|n| n == name) {
        return RiskTier::NeedsApproval;
    }
    if auto_approve.iter().any(|n| n == name) {
        return RiskTier::Safe;
    }
    let lower = name.to_lowercase();
    if MUTATING_NAME_PARTS.iter().any(|part| lower.contains(part)) {
        RiskTier::NeedsApproval
    } else {
        RiskTier::Safe
    }
}

/// Extract the observation text from a `tools/call` result.
///
/// Servers disagree on the shape, so the first match wins:
/// `content[0].text`, `content` (string), `output`, `files` (joined by
/// newline), `info`, and finally the compact JSON of the whole result.
pub fn result_text(result: &Value) -> String {
    if let Some(content) = result.get("content") {
        if let Some(text) = content
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get("text"))
            .and_then(Value::as_str)
        {
            return text.to_string();
        }
        if let Some(text) = content.as_str() {
            return text.to_string();
        }
    }
    if let Some(output) = result.get("output") {
        return value_to_text(output);
    }
    if let Some(files) = result.get("files") {
        return match files.as_array() {
            Some(items) => items
                .iter()
                .map(value_to_text)
                .collect::<Vec<_>>()
                .join("\n"),
            None => value_to_text(files),
        };
    }
    if let Some(info) = result.get("info") {
        return value_to_text(info);
    }
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether the result flags itself as a failure (`isError: true`)
pub fn result_is_error(result: &Value) -> bool {
    result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_on_one_line() {
        let request = JsonRpcRequest::new(
            7,
            "tools/call",
            Some(json!({"name": "read_file", "arguments": {"path": "a\nb"}})),
        );
        let line = serde_json::to_string(&request).unwrap();

        assert!(!line.contains('\n'));
        assert!(line.contains("\"id\":7"));
        assert!(line.contains("\"jsonrpc\":\"2.0\""));
    }

    #[test]
    fn test_result_text_shapes() {
        assert_eq!(
            result_text(&json!({"content": [{"type": "text", "text": "hello"}]})),
            "hello"
        );
        assert_eq!(result_text(&json!({"content": "plain"})), "plain");
        assert_eq!(result_text(&json!({"output": "ran"})), "ran");
        assert_eq!(result_text(&json!({"files": ["a.txt", "b/"]})), "a.txt\nb/");
        assert_eq!(result_text(&json!({"info": "linux"})), "linux");
        assert_eq!(result_text(&json!({"other": 1})), r#"{"other":1}"#);
    }

    #[test]
    fn test_content_takes_precedence_over_output() {
        let result = json!({"output": "second", "content": [{"text": "first"}]});
        assert_eq!(result_text(&result), "first");
    }

    #[test]
    fn test_classify_tier_by_name() {
        assert_eq!(classify_tier("read_file", &[], &[]), RiskTier::Safe);
        assert_eq!(classify_tier("write_file", &[], &[]), RiskTier::NeedsApproval);
        assert_eq!(classify_tier("execute_command", &[], &[]), RiskTier::NeedsApproval);
        assert_eq!(classify_tier("list_directory", &[], &[]), RiskTier::Safe);
    }

    #[test]
    fn test_classify_tier_config_overrides() {
        let auto = vec!["create_note".to_string()];
        let required = vec!["fetch_url".to_string()];

        assert_eq!(classify_tier("create_note", &auto, &required), RiskTier::Safe);
        assert_eq!(classify_tier("fetch_url", &auto, &required), RiskTier::NeedsApproval);
    }

    #[test]
    fn test_remote_tool_into_definition() {
        let tool: RemoteTool = serde_json::from_value(json!({
            "name": "read_file",
            "description": "Read a file",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "File path"},
                    "encoding": {"type": "string"}
                },
                "required": ["path"]
            }
        }))
        .unwrap();

        let definition = tool.into_definition(RiskTier::Safe);

        assert_eq!(definition.name, "read_file");
        assert_eq!(definition.parameters.len(), 2);
        let path = definition.parameters.iter().find(|p| p.name == "path").unwrap();
        assert!(path.required);
        assert_eq!(path.param_type, "string");
        let encoding = definition.parameters.iter().find(|p| p.name == "encoding").unwrap();
        assert!(!encoding.required);
    }
}
