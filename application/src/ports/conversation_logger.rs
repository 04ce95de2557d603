//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording what happened in a
//! turn (user messages, model requests and replies, tool calls, approvals)
//! to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// Event type identifiers written by the use cases
pub mod event_types {
    pub const USER_MESSAGE: &str = "user_message";
    pub const CLASSIFICATION: &str = "classification";
    pub const LLM_REQUEST: &str = "llm_request";
    pub const LLM_RESPONSE: &str = "llm_response";
    pub const TOOL_CALL: &str = "tool_call";
    pub const TOOL_RESULT: &str = "tool_result";
    pub const APPROVAL_REQUESTED: &str = "approval_requested";
    pub const APPROVAL_RESOLVED: &str = "approval_resolved";
    pub const FINAL_ANSWER: &str = "final_answer";
    pub const TURN_ERROR: &str = "turn_error";
}

/// A structured conversation event for logging.
///
/// The adapter adds the timestamp when it writes the record.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier, one of [`event_types`]
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and non-fallible: a logging failure must never
/// fail the turn, so adapters swallow their own errors.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
