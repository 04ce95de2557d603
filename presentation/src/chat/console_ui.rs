//! Terminal implementation of [`ChatUiPort`]

use crate::ConsoleFormatter;
use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use toolgate_application::{ChatUiError, ChatUiPort, UiMessage, UiMessageKind};

/// Prints replies to stdout/stderr and reads yes/no answers from stdin
pub struct ConsoleChatUi {
    show_thinking: bool,
    show_stream: bool,
    /// Tokens were echoed since the last complete message
    streamed: AtomicBool,
}

impl ConsoleChatUi {
    pub fn new() -> Self {
        Self {
            show_thinking: true,
            show_stream: false,
            streamed: AtomicBool::new(false),
        }
    }

    pub fn with_thinking(mut self, show: bool) -> Self {
        self.show_thinking = show;
        self
    }

    /// Echo model tokens as they arrive
    pub fn with_stream(mut self, show: bool) -> Self {
        self.show_stream = show;
        self
    }

    /// Rendered text for a message, or `None` when it is hidden
    fn render(&self, message: &UiMessage) -> Option<String> {
        if message.kind == UiMessageKind::Thinking && !self.show_thinking {
            return None;
        }
        if message.content.trim().is_empty() {
            return None;
        }
        Some(ConsoleFormatter::format(message))
    }
}

impl Default for ConsoleChatUi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatUiPort for ConsoleChatUi {
    async fn send(&self, message: UiMessage) -> Result<(), ChatUiError> {
        if self.streamed.swap(false, Ordering::SeqCst) {
            println!();
        }
        let Some(text) = self.render(&message) else {
            return Ok(());
        };
        if message.kind == UiMessageKind::Error {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
        Ok(())
    }

    fn stream_token(&self, token: &str) {
        if !self.show_stream {
            return;
        }
        self.streamed.store(true, Ordering::SeqCst);
        print!("{}", token.dimmed());
        let _ = std::io::stdout().flush();
    }

    async fn ask_yes_no(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Option<String>, ChatUiError> {
        print!("{} ", "[yes/no] >".yellow().bold());
        std::io::stdout()
            .flush()
            .map_err(|e| ChatUiError::Io(e.to_string()))?;
        tracing::debug!(prompt = %prompt, "Waiting for approval answer");

        let mut reader = BufReader::new(tokio::io::stdin());
        let mut line = String::new();
        match tokio::time::timeout(timeout, reader.read_line(&mut line)).await {
            Err(_) => {
                println!();
                Ok(None)
            }
            Ok(Err(e)) => Err(ChatUiError::Io(e.to_string())),
            Ok(Ok(0)) => Err(ChatUiError::Closed),
            Ok(Ok(_)) => Ok(Some(line.trim().to_string())),
        }
    }
}
