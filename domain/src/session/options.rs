//! Generation options for a model completion.

use serde::{Deserialize, Serialize};

/// Sampling and resource options sent with every completion request.
///
/// Unset (`None`) values are left to the backend's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub repeat_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Context window size in tokens
    pub context_window: Option<u32>,
    /// Keep the model resident in memory between requests
    pub keep_alive: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            top_p: Some(0.8),
            top_k: Some(20),
            repeat_penalty: Some(1.05),
            presence_penalty: Some(1.5),
            max_tokens: Some(4096),
            context_window: None,
            keep_alive: true,
        }
    }
}

impl GenerationOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}
