//! LLM Gateway port
//!
//! Defines the interface for communicating with the chat model backend.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use toolgate_domain::{GenerationOptions, Message, StreamEvent};

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to the model backend.
/// Implementations (adapters) live in the infrastructure layer. A gateway is
/// shared by every conversation, so implementations must be safe for
/// concurrent use.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Name of the model this gateway talks to
    fn model_name(&self) -> &str;

    /// Send the whole conversation and return the complete reply text
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, GatewayError>;

    /// Send the conversation and receive the reply as a stream of events.
    ///
    /// Default implementation calls `complete()` and wraps the result in a
    /// single `Completed` event. Streamed deltas must concatenate to the same
    /// text a non-streamed call would return.
    async fn complete_streaming(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<StreamHandle, GatewayError> {
        let result = self.complete(messages, options).await?;
        let (tx, rx) = mpsc::channel(1);
        // receiver may already be gone
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }

    /// Load the model ahead of the first request.
    async fn warm_up(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Handle for receiving streaming events from the backend.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(self) -> Result<String, GatewayError> {
        self.forward(|_| {}).await
    }

    /// Consume the stream, handing every delta to `on_delta` as it arrives,
    /// and return the full text.
    ///
    /// A stream that delivers its text only in `Completed` is handed to
    /// `on_delta` as one chunk.
    pub async fn forward(mut self, mut on_delta: impl FnMut(&str)) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    on_delta(&chunk);
                    full_text.push_str(&chunk);
                }
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        on_delta(&text);
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed: return what we have
        Ok(full_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGateway;

    #[async_trait]
    impl LlmGateway for EchoGateway {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            messages: &[Message],
            _options: &GenerationOptions,
        ) -> Result<String, GatewayError> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_default_streaming_wraps_complete() {
        let handle = EchoGateway
            .complete_streaming(&[Message::user("hello")], &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(handle.collect_text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_forward_concatenates_deltas() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("Hel".into())).await.unwrap();
        tx.send(StreamEvent::Delta("lo".into())).await.unwrap();
        tx.send(StreamEvent::Completed(String::new())).await.unwrap();

        let mut seen = Vec::new();
        let text = StreamHandle::new(rx)
            .forward(|d| seen.push(d.to_string()))
            .await
            .unwrap();

        assert_eq!(text, "Hello");
        assert_eq!(seen, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_stream_error_becomes_request_failed() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("partial".into())).await.unwrap();
        tx.send(StreamEvent::Error("model crashed".into())).await.unwrap();

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert_eq!(err, GatewayError::RequestFailed("model crashed".into()));
    }

    #[tokio::test]
    async fn test_closed_channel_returns_partial_text() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("abc".into())).await.unwrap();
        drop(tx);
        assert_eq!(StreamHandle::new(rx).collect_text().await.unwrap(), "abc");
    }
}
