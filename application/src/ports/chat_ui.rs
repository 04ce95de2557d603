//! Chat UI port.
//!
//! [`ChatUiPort`] is the output side of a conversation: answers, thinking
//! blocks, approval prompts and streamed tokens all go through it.
//!
//! # Approval flow
//!
//! In chat mode approval is never a blocking call. The approval prompt is
//! sent like any other message and the user's next message answers it. Only
//! single-shot mode, where there is no next message, uses
//! [`ChatUiPort::ask_yes_no`].
//!
//! # Built-in Implementations
//!
//! - [`SilentChatUi`] - drops every message, answers nothing (times out)
//! - [`AutoApproveChatUi`] - wraps another UI and answers every approval with "yes"

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a UI adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatUiError {
    /// The user closed the input (e.g. Ctrl+D)
    #[error("Input closed")]
    Closed,

    /// Terminal read/write failure
    #[error("I/O error: {0}")]
    Io(String),
}

/// What a [`UiMessage`] carries, so adapters can style it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMessageKind {
    /// The assistant's answer
    Answer,
    /// Internal reasoning extracted from `<think>` blocks
    Thinking,
    /// A request for the user's yes/no
    ApprovalRequest,
    /// Informational status (cancelled, denied, limit reached)
    Notice,
    /// A failure the user should notice
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiMessage {
    pub kind: UiMessageKind,
    pub content: String,
}

impl UiMessage {
    pub fn new(kind: UiMessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn answer(content: impl Into<String>) -> Self {
        Self::new(UiMessageKind::Answer, content)
    }

    pub fn thinking(content: impl Into<String>) -> Self {
        Self::new(UiMessageKind::Thinking, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(UiMessageKind::Error, content)
    }
}

/// Port for the conversation's user interface
#[async_trait]
pub trait ChatUiPort: Send + Sync {
    /// Show a complete message
    async fn send(&self, message: UiMessage) -> Result<(), ChatUiError>;

    /// Show one streamed token of the model's output
    fn stream_token(&self, _token: &str) {}

    /// Ask a yes/no question and wait up to `timeout`.
    ///
    /// Returns the user's raw reply, or `None` when the timeout elapsed.
    async fn ask_yes_no(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Option<String>, ChatUiError>;
}

/// UI that shows nothing and never answers.
pub struct SilentChatUi;

#[async_trait]
impl ChatUiPort for SilentChatUi {
    async fn send(&self, _message: UiMessage) -> Result<(), ChatUiError> {
        Ok(())
    }

    async fn ask_yes_no(
        &self,
        _prompt: &str,
        _timeout: Duration,
    ) -> Result<Option<String>, ChatUiError> {
        Ok(None)
    }
}

/// Wraps a UI and answers every approval question with "yes".
///
/// Used for `--yes`: messages still reach the inner UI.
pub struct AutoApproveChatUi {
    inner: Arc<dyn ChatUiPort>,
}

impl AutoApproveChatUi {
    pub fn new(inner: Arc<dyn ChatUiPort>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatUiPort for AutoApproveChatUi {
    async fn send(&self, message: UiMessage) -> Result<(), ChatUiError> {
        self.inner.send(message).await
    }

    fn stream_token(&self, token: &str) {
        self.inner.stream_token(token);
    }

    async fn ask_yes_no(
        &self,
        _prompt: &str,
        _timeout: Duration,
    ) -> Result<Option<String>, ChatUiError> {
        Ok(Some("yes".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingUi {
        sent: Mutex<Vec<UiMessage>>,
    }

    #[async_trait]
    impl ChatUiPort for RecordingUi {
        async fn send(&self, message: UiMessage) -> Result<(), ChatUiError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn ask_yes_no(
            &self,
            _prompt: &str,
            _timeout: Duration,
        ) -> Result<Option<String>, ChatUiError> {
            Ok(Some("no".to_string()))
        }
    }

    #[tokio::test]
    async fn test_silent_ui_times_out() {
        let reply = SilentChatUi
            .ask_yes_no("Proceed?", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, None);
    }

    #[tokio::test]
    async fn test_auto_approve_answers_yes_and_forwards_messages() {
        let inner = Arc::new(RecordingUi::default());
        let ui = AutoApproveChatUi::new(inner.clone());

        ui.send(UiMessage::answer("hi")).await.unwrap();
        let reply = ui.ask_yes_no("Proceed?", Duration::from_secs(1)).await.unwrap();

        assert_eq!(reply.as_deref(), Some("yes"));
        assert_eq!(inner.sent.lock().unwrap().as_slice(), &[UiMessage::answer("hi")]);
    }
}
