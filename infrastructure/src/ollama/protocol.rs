//! Ollama `/api/chat` wire types and the NDJSON line buffer.

use serde::{Deserialize, Serialize};
use toolgate_domain::{GenerationOptions, Message};

/// Request body for `POST /api/chat`
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    pub options: ChatOptions,
    /// `-1` keeps the model loaded indefinitely; absent uses the server default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<i64>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(
        model: &'a str,
        messages: &'a [Message],
        options: &GenerationOptions,
        stream: bool,
    ) -> Self {
        Self {
            model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream,
            options: ChatOptions::from(options),
            keep_alive: options.keep_alive.then_some(-1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Sampling options in Ollama's naming
#[derive(Debug, Default, Serialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

impl From<&GenerationOptions> for ChatOptions {
    fn from(options: &GenerationOptions) -> Self {
        Self {
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            repeat_penalty: options.repeat_penalty,
            presence_penalty: options.presence_penalty,
            num_predict: options.max_tokens,
            num_ctx: options.context_window,
        }
    }
}

/// One response object (the whole reply, or one streamed chunk)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
}

/// Splits a byte stream into newline-delimited JSON objects.
///
/// Chunks from the HTTP body can end mid-line (or mid-UTF-8 sequence); the
/// incomplete tail stays buffered until the next chunk.
#[derive(Debug, Default)]
pub struct NdjsonBuffer {
    pending: Vec<u8>,
}

impl NdjsonBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every complete, non-blank line
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line).trim().to_string();
            if !text.is_empty() {
                lines.push(text);
            }
        }
        lines
    }

    /// Whatever is left once the body has ended
    pub fn finish(&mut self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        (!rest.is_empty()).then_some(rest)
    }
}
