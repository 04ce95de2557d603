//! Application layer for toolgate
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_EMPTY_RESPONSE_FALLBACK, ReasoningParams};
pub use ports::{
    chat_ui::{AutoApproveChatUi, ChatUiError, ChatUiPort, SilentChatUi, UiMessage, UiMessageKind},
    composite_progress::CompositeProgressNotifier,
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
    reasoning_progress::{NoReasoningProgress, ReasoningProgressNotifier},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::handle_message::{
    CANCELLED_REPLY, ChatSession, HandleMessageUseCase, TurnReply, TurnReplyKind, YES_NO_REMINDER,
};
pub use use_cases::preload::{BackendCell, GatewayFactory, PreloadedGateway, gateway_factory};
pub use use_cases::reasoning_loop::{ReasoningError, ReasoningLoopUseCase};
