//! Shared helpers for tool use cases.

use toolgate_domain::core::string::truncate;
use toolgate_domain::tool::entities::ToolCall;

const PREVIEW_LEN: usize = 50;

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys (`path`, `command`, `query`, `info_type`)
/// first, then falls back to the first string value found.
pub(crate) fn tool_args_preview(call: &ToolCall) -> String {
    let keys = ["path", "command", "query", "info_type"];
    for key in &keys {
        if let Some(s) = call.get_string(key) {
            return truncate(s, PREVIEW_LEN);
        }
    }
    call.arguments
        .values()
        .find_map(|v| v.as_str())
        .map(|s| truncate(s, PREVIEW_LEN))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_key_preferred() {
        let call = ToolCall::new("read_file")
            .with_arg("other", "ignored")
            .with_arg("path", "src/main.rs");
        assert_eq!(tool_args_preview(&call), "src/main.rs");
    }

    #[test]
    fn test_command_key() {
        let call = ToolCall::new("execute_command").with_arg("command", "ls -la");
        assert_eq!(tool_args_preview(&call), "ls -la");
    }

    #[test]
    fn test_fallback_to_first_string() {
        let call = ToolCall::new("custom")
            .with_arg("count", 3)
            .with_arg("label", "hello");
        assert_eq!(tool_args_preview(&call), "hello");
    }

    #[test]
    fn test_no_string_args() {
        let call = ToolCall::new("custom").with_arg("count", 3);
        assert_eq!(tool_args_preview(&call), "");
    }

    #[test]
    fn test_long_value_truncated() {
        let long = "x".repeat(200);
        let call = ToolCall::new("write_file").with_arg("path", long);
        assert!(tool_args_preview(&call).chars().count() <= PREVIEW_LEN + 3);
    }
}
