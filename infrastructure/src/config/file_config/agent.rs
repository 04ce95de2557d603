//! Reasoning loop configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolgate_application::ReasoningParams;
use toolgate_domain::ComplexityPolicy;

/// Raw agent configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Reasoning cycles per turn
    pub max_iterations: usize,
    /// Queries with more words than this take the tool-using path
    pub word_threshold: usize,
    /// Replaces the built-in complexity keywords when set
    pub complexity_keywords: Option<Vec<String>>,
    /// Observation substrings that mark a tool call as failed
    pub error_indicators: Vec<String>,
    /// Reply used when the model answers with nothing
    pub empty_response_fallback: String,
    /// Pending approvals older than this are dropped
    pub approval_timeout_seconds: u64,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let params = ReasoningParams::default();
        Self {
            max_iterations: params.max_iterations,
            word_threshold: params.complexity.word_threshold,
            complexity_keywords: None,
            error_indicators: params.error_indicators,
            empty_response_fallback: params.empty_response_fallback,
            approval_timeout_seconds: params
                .approval_timeout
                .map(|t| t.as_secs())
                .unwrap_or(300),
        }
    }
}

impl FileAgentConfig {
    pub fn complexity_policy(&self) -> ComplexityPolicy {
        let mut policy = ComplexityPolicy {
            word_threshold: self.word_threshold,
            ..ComplexityPolicy::default()
        };
        if let Some(keywords) = &self.complexity_keywords {
            policy.keywords = keywords.clone();
        }
        policy
    }

    pub fn approval_timeout(&self) -> Duration {
        Duration::from_secs(self.approval_timeout_seconds)
    }
}
