//! LLM Gateway implementation for Ollama-compatible servers

use super::error::OllamaError;
use super::protocol::{ChatRequest, ChatResponse, NdjsonBuffer};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::mpsc;
use toolgate_application::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use toolgate_domain::{GenerationOptions, Message, StreamEvent};
use tracing::{debug, info, trace, warn};

/// Default server address
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway to an Ollama-compatible `/api/chat` endpoint
pub struct OllamaGateway {
    client: reqwest::Client,
    chat_url: String,
    model: String,
}

impl OllamaGateway {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, OllamaError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(OllamaError::ClientBuild)?;
        Ok(Self {
            client,
            chat_url: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.into(),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    async fn post(&self, request: &ChatRequest<'_>) -> Result<reqwest::Response, OllamaError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    OllamaError::Connection {
                        url: self.chat_url.clone(),
                        source: e,
                    }
                } else {
                    OllamaError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(OllamaError::ModelNotFound(self.model.clone()));
        }
        Err(OllamaError::Status {
            status: status.as_u16(),
            body: error_message(&body),
        })
    }

    async fn chat(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, OllamaError> {
        let request = ChatRequest::new(&self.model, messages, options, false);
        let response = self.post(&request).await?;
        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;
        if let Some(error) = parsed.error {
            return Err(OllamaError::Backend(error));
        }
        Ok(parsed.content().to_string())
    }
}

/// Pull `{"error": "..."}` out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ChatResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Read the NDJSON body, forwarding each chunk's content as a delta.
async fn pump_stream(mut response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut buffer = NdjsonBuffer::new();
    let mut full_text = String::new();

    loop {
        let bytes = match response.chunk().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };
        for line in buffer.push(&bytes) {
            match handle_line(&line, &mut full_text, &tx).await {
                LineOutcome::Continue => {}
                LineOutcome::Stop => return,
            }
        }
    }

    if let Some(line) = buffer.finish()
        && let LineOutcome::Stop = handle_line(&line, &mut full_text, &tx).await
    {
        return;
    }
    // body ended without a done marker
    let _ = tx.send(StreamEvent::Completed(full_text)).await;
}

enum LineOutcome {
    Continue,
    Stop,
}

async fn handle_line(
    line: &str,
    full_text: &mut String,
    tx: &mpsc::Sender<StreamEvent>,
) -> LineOutcome {
    let chunk: ChatResponse = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(error = %e, "Skipping undecodable stream line");
            return LineOutcome::Continue;
        }
    };
    if let Some(error) = chunk.error {
        let _ = tx.send(StreamEvent::Error(error)).await;
        return LineOutcome::Stop;
    }
    let content = chunk.content();
    if !content.is_empty() {
        full_text.push_str(content);
        if tx.send(StreamEvent::Delta(content.to_string())).await.is_err() {
            // receiver dropped (cancelled or timed out)
            return LineOutcome::Stop;
        }
    }
    if chunk.done {
        let _ = tx
            .send(StreamEvent::Completed(std::mem::take(full_text)))
            .await;
        return LineOutcome::Stop;
    }
    LineOutcome::Continue
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        debug!(model = %self.model, messages = messages.len(), "Sending chat request");
        let text = self.chat(messages, options).await?;
        trace!(chars = text.len(), "Chat response received");
        Ok(text)
    }

    async fn complete_streaming(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<StreamHandle, GatewayError> {
        debug!(model = %self.model, messages = messages.len(), "Sending streamed chat request");
        let request = ChatRequest::new(&self.model, messages, options, true);
        let response = self.post(&request).await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(pump_stream(response, tx));
        Ok(StreamHandle::new(rx))
    }

    /// An empty-message chat request makes the server load the model.
    async fn warm_up(&self) -> Result<(), GatewayError> {
        info!(model = %self.model, "Loading model");
        let options = GenerationOptions::default();
        let request = ChatRequest::new(&self.model, &[], &options, false);
        self.post(&request).await?;
        Ok(())
    }
}
