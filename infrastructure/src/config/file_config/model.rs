//! Model backend configuration from TOML (`[model]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolgate_domain::GenerationOptions;

/// Raw model configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model name as known to the backend (e.g. "qwen3:14b")
    pub name: String,
    /// Base URL of the Ollama-compatible server
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Stream tokens as they are generated
    pub stream: bool,
    /// Keep the model resident between requests
    pub keep_alive: bool,
    /// Load the model at startup instead of on the first request
    pub preload: bool,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub repeat_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Context window size in tokens
    pub context_window: Option<u32>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        let options = GenerationOptions::default();
        Self {
            name: "qwen3:14b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_seconds: 120,
            stream: true,
            keep_alive: true,
            preload: true,
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            repeat_penalty: options.repeat_penalty,
            presence_penalty: options.presence_penalty,
            max_tokens: options.max_tokens,
            context_window: Some(8192),
        }
    }
}

impl FileModelConfig {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            repeat_penalty: self.repeat_penalty,
            presence_penalty: self.presence_penalty,
            max_tokens: self.max_tokens,
            context_window: self.context_window,
            keep_alive: self.keep_alive,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
