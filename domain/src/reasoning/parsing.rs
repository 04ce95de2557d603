//! Parsing of raw model output.
//!
//! The model speaks a fixed text protocol:
//!
//! ```text
//! <think>private reasoning</think>
//! Thought: I need to look at the directory.
//! <tool_call>{"name": "list_directory", "arguments": {"path": "."}}</tool_call>
//! ...
//! Final Answer: the user-facing answer
//! ```
//!
//! All functions here are pure and never fail; malformed tool-call blocks
//! are reported back to the caller in [`ParsedToolCalls::malformed`] so
//! they can be logged.

use crate::tool::entities::ToolCall;
use serde_json::{Map, Value};

pub const TOOL_CALL_OPEN: &str = "<tool_call>";
pub const TOOL_CALL_CLOSE: &str = "</tool_call>";
pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";
pub const OBSERVATION_MARKER: &str = "Observation:";

const ACTION_MARKER: &str = "Action:";
const ACTION_INPUT_MARKER: &str = "Action Input:";

/// A tool-call block that could not be turned into a [`ToolCall`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedToolCall {
    /// Raw block content
    pub raw: String,
    /// Why it was rejected
    pub reason: String,
}

/// Tool calls found in a response, in the order they appear
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedToolCalls {
    pub calls: Vec<ToolCall>,
    pub malformed: Vec<MalformedToolCall>,
}

/// Extract tool calls from model output.
///
/// See [`parse_tool_calls`] for the rules; malformed blocks are dropped.
pub fn extract_tool_calls(text: &str) -> Vec<ToolCall> {
    parse_tool_calls(text).calls
}

/// Scan model output for `<tool_call>` blocks.
///
/// - Blocks inside `<think>` regions are ignored.
/// - A block's body may be wrapped in a ```` ```json ```` fence.
/// - `arguments` may be an object, a JSON-encoded string, or absent.
/// - A block without a closing tag extends to the end of the text.
/// - When no block is present at all, the `Action:` / `Action Input:`
///   format is tried as a fallback.
pub fn parse_tool_calls(text: &str) -> ParsedToolCalls {
    let visible = remove_think_regions(text);
    let mut parsed = ParsedToolCalls::default();
    let mut rest = visible.as_str();
    let mut found_block = false;

    while let Some(start) = rest.find(TOOL_CALL_OPEN) {
        found_block = true;
        let after_open = &rest[start + TOOL_CALL_OPEN.len()..];
        let (body, remainder) = match after_open.find(TOOL_CALL_CLOSE) {
            Some(end) => (
                &after_open[..end],
                &after_open[end + TOOL_CALL_CLOSE.len()..],
            ),
            None => (after_open, ""),
        };

        match parse_call_body(body) {
            Ok(call) => parsed.calls.push(call),
            Err(reason) => parsed.malformed.push(MalformedToolCall {
                raw: body.trim().to_string(),
                reason,
            }),
        }
        rest = remainder;
    }

    if !found_block && let Some(call) = parse_action_format(&visible) {
        parsed.calls.push(call);
    }

    parsed
}

fn parse_call_body(body: &str) -> Result<ToolCall, String> {
    let json = strip_code_fence(body.trim());
    if json.is_empty() {
        return Err("empty tool call block".to_string());
    }

    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid JSON: {}", e))?;
    let object = value
        .as_object()
        .ok_or_else(|| "tool call is not a JSON object".to_string())?;

    let name = object
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "missing \"name\" field".to_string())?;

    let arguments = match object.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => return Err("\"arguments\" string is not a JSON object".to_string()),
        },
        Some(_) => return Err("\"arguments\" must be an object".to_string()),
    };

    Ok(ToolCall::new(name).with_arguments(arguments))
}

/// `Action: read_file` + `Action Input: {"path": "foo.txt"}`
fn parse_action_format(text: &str) -> Option<ToolCall> {
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let Some(name) = line.trim().strip_prefix(ACTION_MARKER) else {
            continue;
        };
        let name = name.trim().trim_matches('`');
        if name.is_empty() {
            continue;
        }

        let input = lines
            .next()
            .and_then(|l| l.trim().strip_prefix(ACTION_INPUT_MARKER))
            .map(str::trim)
            .unwrap_or_default();

        let arguments = match serde_json::from_str::<Value>(strip_code_fence(input)) {
            Ok(Value::Object(map)) => map,
            _ if input.is_empty() => Map::new(),
            _ => {
                let mut map = Map::new();
                map.insert(
                    "input".to_string(),
                    Value::String(input.trim_matches('"').to_string()),
                );
                map
            }
        };
        return Some(ToolCall::new(name).with_arguments(arguments));
    }
    None
}

fn strip_code_fence(s: &str) -> &str {
    let Some(inner) = s.strip_prefix("```") else {
        return s;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Return the text after the first `Final Answer:` marker, if any.
///
/// The marker is ignored inside `<think>` regions.
pub fn extract_final_answer(text: &str) -> Option<String> {
    let visible = remove_think_regions(text);
    let start = visible.find(FINAL_ANSWER_MARKER)?;
    Some(visible[start + FINAL_ANSWER_MARKER.len()..].trim().to_string())
}

/// Concatenated contents of all `<think>` regions, if any are non-empty.
pub fn extract_thinking(text: &str) -> Option<String> {
    let mut parts = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(THINK_OPEN) {
        let after_open = &rest[start + THINK_OPEN.len()..];
        match after_open.find(THINK_CLOSE) {
            Some(end) => {
                parts.push(after_open[..end].trim());
                rest = &after_open[end + THINK_CLOSE.len()..];
            }
            None => {
                parts.push(after_open.trim());
                break;
            }
        }
    }

    let thinking = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    (!thinking.is_empty()).then_some(thinking)
}

/// Remove reasoning regions and tool-call blocks; substitute `fallback`
/// when nothing user-visible remains.
pub fn strip_internal_reasoning(text: &str, fallback: &str) -> String {
    let stripped = strip_markup(text);
    if stripped.is_empty() {
        fallback.to_string()
    } else {
        stripped
    }
}

/// Remove reasoning regions and tool-call blocks, trimmed. May be empty.
pub fn strip_markup(text: &str) -> String {
    let without_think = remove_think_regions(text);
    remove_regions(&without_think, TOOL_CALL_OPEN, TOOL_CALL_CLOSE)
        .trim()
        .to_string()
}

/// Truncate a response at the first line the model wrote as an
/// `Observation:` for itself.
///
/// Lines inside a `<think>` region are the model's own reasoning and never
/// trigger the cut. Returns the trusted prefix and whether anything was cut off.
pub fn discard_fabricated_observation(text: &str) -> (String, bool) {
    let mut offset = 0;
    let mut in_think = false;
    for line in text.split_inclusive('\n') {
        if !in_think && line.trim_start().starts_with(OBSERVATION_MARKER) {
            return (text[..offset].trim_end().to_string(), true);
        }
        in_think = think_state_after(line, in_think);
        offset += line.len();
    }
    (text.to_string(), false)
}

/// Whether a reasoning region is still open after `line`
fn think_state_after(line: &str, mut in_think: bool) -> bool {
    let mut rest = line;
    loop {
        let tag = if in_think { THINK_CLOSE } else { THINK_OPEN };
        match rest.find(tag) {
            Some(pos) => {
                rest = &rest[pos + tag.len()..];
                in_think = !in_think;
            }
            None => return in_think,
        }
    }
}

fn remove_think_regions(text: &str) -> String {
    remove_regions(text, THINK_OPEN, THINK_CLOSE)
}

/// Remove every `open ... close` region. An unterminated region hides
/// everything after its opening tag; a stray closing tag is dropped.
fn remove_regions(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + open.len()..];
        match after_open.find(close) {
            Some(end) => rest = &after_open[end + close.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.replace(close, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tool_calls() {
        assert!(extract_tool_calls("Just a plain answer.").is_empty());
        assert!(extract_tool_calls("").is_empty());
    }

    #[test]
    fn test_single_tool_call() {
        let calls = extract_tool_calls(
            r#"<tool_call>{"name":"read_file","arguments":{"path":"foo.txt"}}</tool_call>"#,
        );
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "read_file");
        assert_eq!(calls[0].get_string("path"), Some("foo.txt"));
        assert_eq!(calls[0].arguments.len(), 1);
    }

    #[test]
    fn test_multiple_calls_keep_order_and_skip_malformed() {
        let text = r#"Thought: two steps
<tool_call>{"name": "list_directory", "arguments": {"path": "."}}</tool_call>
<tool_call>{"name": "broken", "arguments": </tool_call>
<tool_call>
{"name": "read_file", "arguments": {"path": "a.txt"}}
</tool_call>"#;

        let parsed = parse_tool_calls(text);
        let names: Vec<_> = parsed.calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["list_directory", "read_file"]);
        assert_eq!(parsed.malformed.len(), 1);
        assert!(parsed.malformed[0].reason.starts_with("invalid JSON"));
    }

    #[test]
    fn test_lenient_block_shapes() {
        let fenced = "<tool_call>\n```json\n{\"name\": \"system_info\"}\n```\n</tool_call>";
        let calls = extract_tool_calls(fenced);
        assert_eq!(calls[0].name, "system_info");
        assert!(calls[0].arguments.is_empty());

        let stringly =
            r#"<tool_call>{"name": "read_file", "arguments": "{\"path\": \"x\"}"}</tool_call>"#;
        assert_eq!(extract_tool_calls(stringly)[0].get_string("path"), Some("x"));

        let unterminated = r#"<tool_call>{"name": "system_info", "arguments": {}}"#;
        assert_eq!(extract_tool_calls(unterminated).len(), 1);
    }

    #[test]
    fn test_block_without_name_is_malformed() {
        let parsed = parse_tool_calls(r#"<tool_call>{"arguments": {}}</tool_call>"#);
        assert!(parsed.calls.is_empty());
        assert_eq!(parsed.malformed[0].reason, "missing \"name\" field");
    }

    #[test]
    fn test_tool_calls_inside_think_are_ignored() {
        let text = r#"<think>maybe <tool_call>{"name":"write_file","arguments":{}}</tool_call></think>
<tool_call>{"name":"read_file","arguments":{"path":"a"}}</tool_call>"#;
        let calls = extract_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "read_file");
    }

    #[test]
    fn test_action_fallback() {
        let text = "Thought: consider file\nAction: read_file\nAction Input: {\"path\": \"foo.txt\"}\n";
        let calls = extract_tool_calls(text);
        assert_eq!(calls, vec![ToolCall::new("read_file").with_arg("path", "foo.txt")]);
    }

    #[test]
    fn test_action_fallback_with_plain_input() {
        let calls = extract_tool_calls("Action: system_info\nAction Input: os");
        assert_eq!(calls[0].get_string("input"), Some("os"));

        let no_input = extract_tool_calls("Action: system_info");
        assert!(no_input[0].arguments.is_empty());
    }

    #[test]
    fn test_action_fallback_not_used_when_block_present() {
        let text = "Action: read_file\nAction Input: {}\n<tool_call>{\"name\":\"list_directory\"}</tool_call>";
        let calls = extract_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "list_directory");
    }

    #[test]
    fn test_extract_final_answer() {
        assert_eq!(
            extract_final_answer("Thought: done\nFinal Answer:  Paris \n"),
            Some("Paris".to_string())
        );
        assert_eq!(extract_final_answer("no marker here"), None);
        assert_eq!(
            extract_final_answer("<think>Final Answer: draft</think>still thinking"),
            None
        );
    }

    #[test]
    fn test_strip_internal_reasoning() {
        assert_eq!(strip_internal_reasoning("<think>plan</think>Hello", "fallback"), "Hello");
        assert_eq!(strip_internal_reasoning("<think>plan</think>", "fallback"), "fallback");
        assert_eq!(strip_internal_reasoning("   ", "fallback"), "fallback");
        assert_eq!(
            strip_internal_reasoning(
                "Sure.<tool_call>{\"name\":\"x\"}</tool_call> Done.",
                "fallback"
            ),
            "Sure. Done."
        );
    }

    #[test]
    fn test_unterminated_think_hides_the_rest() {
        assert_eq!(strip_markup("Visible<think>never closed"), "Visible");
        assert_eq!(strip_markup("a</think>b"), "ab");
    }

    #[test]
    fn test_extract_thinking() {
        assert_eq!(
            extract_thinking("<think> one </think>x<think>two</think>"),
            Some("one\n\ntwo".to_string())
        );
        assert_eq!(extract_thinking("<think>  </think>answer"), None);
        assert_eq!(extract_thinking("answer"), None);
    }

    #[test]
    fn test_discard_fabricated_observation() {
        let text = "<tool_call>{\"name\":\"list_directory\"}</tool_call>\nObservation: a.txt\nFinal Answer: a.txt";
        let (kept, discarded) = discard_fabricated_observation(text);
        assert!(discarded);
        assert_eq!(kept, "<tool_call>{\"name\":\"list_directory\"}</tool_call>");

        let (untouched, discarded) = discard_fabricated_observation("Final Answer: ok");
        assert!(!discarded);
        assert_eq!(untouched, "Final Answer: ok");
    }

    #[test]
    fn test_observation_inside_think_is_kept() {
        let text = "<think>\nThought: list it\nObservation: I expect files\n</think>\n<tool_call>{\"name\":\"list_directory\",\"arguments\":{}}</tool_call>";
        let (kept, discarded) = discard_fabricated_observation(text);
        assert!(!discarded);
        assert_eq!(kept, text);

        let parsed = parse_tool_calls(&kept);
        assert_eq!(parsed.calls.len(), 1);
        assert_eq!(parsed.calls[0].name, "list_directory");
    }

    #[test]
    fn test_observation_after_think_closes_is_cut() {
        let text = "<think>plan</think>\n<tool_call>{\"name\":\"read_file\"}</tool_call>\nObservation: faked";
        let (kept, discarded) = discard_fabricated_observation(text);
        assert!(discarded);
        assert!(kept.ends_with("</tool_call>"));

        // an unterminated region keeps hiding what follows
        let (_, discarded) = discard_fabricated_observation("<think>\nObservation: still thinking");
        assert!(!discarded);
    }
}
