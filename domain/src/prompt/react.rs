//! Prompt templates for the reasoning loop

use crate::reasoning::parsing::{FINAL_ANSWER_MARKER, THINK_CLOSE, THINK_OPEN, TOOL_CALL_CLOSE, TOOL_CALL_OPEN};
use crate::tool::entities::ToolSpec;
use crate::tool::value_objects::ToolResult;

/// Built-in persona used when no override is configured
pub const DEFAULT_PERSONA: &str = "You are {name}, a friendly and capable assistant running on the user's own machine. \
You answer concisely and honestly. When you are unsure, you say so. \
You may think privately inside <think></think> tags; the user does not see that part.";

/// Default persona display name
pub const DEFAULT_PERSONA_NAME: &str = "Assistant";

/// Templates for the ReAct (reason + act) loop
#[derive(Debug, Clone)]
pub struct ReactPromptTemplate {
    persona_name: String,
    persona_override: Option<String>,
}

impl Default for ReactPromptTemplate {
    fn default() -> Self {
        Self {
            persona_name: DEFAULT_PERSONA_NAME.to_string(),
            persona_override: None,
        }
    }
}

impl ReactPromptTemplate {
    pub fn new(persona_name: impl Into<String>) -> Self {
        Self {
            persona_name: persona_name.into(),
            persona_override: None,
        }
    }

    /// Replace the built-in persona prompt; `{name}` is substituted
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        if !prompt.trim().is_empty() {
            self.persona_override = Some(prompt);
        }
        self
    }

    pub fn persona_name(&self) -> &str {
        &self.persona_name
    }

    /// Personality-styled system prompt shared by both paths
    pub fn system_prompt(&self) -> String {
        self.persona_override
            .as_deref()
            .unwrap_or(DEFAULT_PERSONA)
            .replace("{name}", &self.persona_name)
    }

    /// Augmented user prompt for a complex query
    pub fn react_instructions(&self, spec: &ToolSpec, query: &str) -> String {
        let tools = spec
            .sorted()
            .into_iter()
            .map(|t| {
                let approval = if t.requires_approval() {
                    " [requires user approval]"
                } else {
                    ""
                };
                format!("- {}: {}{}", t.signature(), t.description, approval)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let tools = if tools.is_empty() {
            "(no tools are available)".to_string()
        } else {
            tools
        };

        format!(
            r#"Answer the following request. You can use tools to look things up or act on the system.

## Available Tools

{tools}

## How to Work

Alternate between these steps:

Thought: reason about what to do next (inside {think_open}{think_close} if you like)
Then either call exactly one tool:
{tool_open}{{"name": "tool_name", "arguments": {{"arg": "value"}}}}{tool_close}
or, once you know the answer, write:
{final_marker} <your answer for the user>

## Rules

- After a tool call, STOP and wait. The system will reply with the real Observation.
- NEVER write "Observation:" yourself and never invent tool output. Only observations supplied by the system are real.
- Do not claim an action succeeded unless an Observation confirmed it.
- If a tool reports an error, tell the user what went wrong.

Request: {query}"#,
            tools = tools,
            think_open = THINK_OPEN,
            think_close = THINK_CLOSE,
            tool_open = TOOL_CALL_OPEN,
            tool_close = TOOL_CALL_CLOSE,
            final_marker = FINAL_ANSWER_MARKER,
            query = query.trim(),
        )
    }

    /// Nudge for a response with neither a tool call nor a final answer
    pub fn continue_nudge(&self) -> String {
        format!(
            "Continue. Either call a tool using {}...{} or give your answer starting with '{}'.",
            TOOL_CALL_OPEN, TOOL_CALL_CLOSE, FINAL_ANSWER_MARKER
        )
    }

    /// Message carrying a real tool observation back to the model
    pub fn observation_message(&self, result: &ToolResult) -> String {
        format!("Observation ({}): {}", result.tool_name, result.text)
    }

    /// Message sent back when some tool-call blocks could not be parsed
    pub fn malformed_call_message(&self, reasons: &[String]) -> String {
        format!(
            "Some tool calls could not be parsed ({}). Use valid JSON: {}{{\"name\": \"...\", \"arguments\": {{...}}}}{}",
            reasons.join("; "),
            TOOL_CALL_OPEN,
            TOOL_CALL_CLOSE
        )
    }

    /// Terminal message when the iteration cap is hit
    pub fn limit_reached_message(&self, max_iterations: usize) -> String {
        format!(
            "I reached my reasoning limit ({} steps) without finishing. Try breaking the request into smaller parts.",
            max_iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{RiskTier, ToolDefinition, ToolParameter};

    #[test]
    fn test_system_prompt_uses_persona_name() {
        let template = ReactPromptTemplate::new("Lumi");
        assert!(template.system_prompt().contains("You are Lumi"));
    }

    #[test]
    fn test_system_prompt_override() {
        let template = ReactPromptTemplate::new("Kai").with_system_prompt("{name} speaks like a pirate.");
        assert_eq!(template.system_prompt(), "Kai speaks like a pirate.");

        let blank = ReactPromptTemplate::default().with_system_prompt("   ");
        assert!(blank.system_prompt().contains("You are Assistant"));
    }

    #[test]
    fn test_react_instructions_list_tools_and_forbid_fabrication() {
        let spec = ToolSpec::new()
            .register(
                ToolDefinition::new("read_file", "Read a file", RiskTier::Safe)
                    .with_parameter(ToolParameter::new("path", "File path", true)),
            )
            .register(ToolDefinition::new("write_file", "Write a file", RiskTier::NeedsApproval));

        let prompt = ReactPromptTemplate::default().react_instructions(&spec, "  read a.txt ");

        assert!(prompt.contains("- read_file(path): Read a file"));
        assert!(prompt.contains("- write_file(): Write a file [requires user approval]"));
        assert!(prompt.contains("NEVER write \"Observation:\""));
        assert!(prompt.contains("<tool_call>"));
        assert!(prompt.contains("Final Answer:"));
        assert!(prompt.ends_with("Request: read a.txt"));
    }

    #[test]
    fn test_react_instructions_without_tools() {
        let prompt = ReactPromptTemplate::default().react_instructions(&ToolSpec::new(), "hi");
        assert!(prompt.contains("(no tools are available)"));
    }

    #[test]
    fn test_observation_message() {
        let result = ToolResult::success("list_directory", "a.txt\nb/");
        assert_eq!(
            ReactPromptTemplate::default().observation_message(&result),
            "Observation (list_directory): a.txt\nb/"
        );
    }

    #[test]
    fn test_limit_reached_message() {
        let text = ReactPromptTemplate::default().limit_reached_message(5);
        assert!(text.starts_with("I reached my reasoning limit"));
        assert!(text.contains('5'));
    }
}
