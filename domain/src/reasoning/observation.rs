//! Cross-checking a claimed final answer against the last real observation.

use crate::tool::value_objects::ToolResult;
use serde::{Deserialize, Serialize};

/// Substrings (case-insensitive) that mark an observation as a failure
pub const DEFAULT_ERROR_INDICATORS: &[&str] = &["error", "not found", "permission denied"];

/// Verdict on a model's `Final Answer:`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerVerdict {
    /// The answer stands (possibly with the observation appended)
    Confirmed(String),
    /// The last tool call failed; the raw observation replaces the answer
    ToolFailed(String),
}

impl AnswerVerdict {
    pub fn text(&self) -> &str {
        match self {
            AnswerVerdict::Confirmed(t) | AnswerVerdict::ToolFailed(t) => t,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AnswerVerdict::ToolFailed(_))
    }
}

/// Guards against a model declaring success over a failed tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationCheck {
    indicators: Vec<String>,
}

impl Default for ObservationCheck {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_INDICATORS.iter().map(|s| s.to_string()))
    }
}

impl ObservationCheck {
    pub fn new(indicators: impl IntoIterator<Item = String>) -> Self {
        Self {
            indicators: indicators
                .into_iter()
                .map(|i| i.to_lowercase())
                .filter(|i| !i.trim().is_empty())
                .collect(),
        }
    }

    /// Whether the observation reports a failure
    pub fn indicates_failure(&self, observation: &ToolResult) -> bool {
        if observation.is_error {
            return true;
        }
        let text = observation.text.to_lowercase();
        self.indicators.iter().any(|i| text.contains(i.as_str()))
    }

    /// Decide what the user sees for `answer`, given the last observation.
    ///
    /// - failed observation → the raw observation, prefixed with a notice
    /// - observation text missing from the answer → appended verbatim
    /// - otherwise → the answer unchanged
    pub fn review(&self, answer: &str, last_observation: Option<&ToolResult>) -> AnswerVerdict {
        let Some(observation) = last_observation else {
            return AnswerVerdict::Confirmed(answer.to_string());
        };

        if self.indicates_failure(observation) {
            return AnswerVerdict::ToolFailed(format!(
                "The last tool call ({}) reported a problem:\n\n{}",
                observation.tool_name, observation.text
            ));
        }

        let observed = observation.text.trim();
        if observed.is_empty() || answer.contains(observed) {
            AnswerVerdict::Confirmed(answer.to_string())
        } else if answer.trim().is_empty() {
            AnswerVerdict::Confirmed(observed.to_string())
        } else {
            AnswerVerdict::Confirmed(format!("{}\n\n{}", answer, observed))
        }
    }
}
