//! Domain layer for toolgate
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Reasoning loop
//!
//! A query is classified as simple or complex. Simple queries get one model
//! call. Complex queries run a bounded ReAct cycle: the model writes a
//! `<tool_call>` block, the tool runs for real, its observation is fed back,
//! until the model writes `Final Answer:`.
//!
//! ## Permission gate
//!
//! Every tool carries a [`RiskTier`]. `NeedsApproval` calls are parked in the
//! [`PermissionGuard`] until the user's next message says yes or no.

pub mod core;
pub mod permission;
pub mod prompt;
pub mod reasoning;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use core::error::DomainError;
pub use permission::{
    ApprovalRequest, ApprovalResolution, PendingApproval, PermissionDecision, PermissionGuard,
};
pub use prompt::ReactPromptTemplate;
pub use reasoning::{
    AnswerVerdict, Classification, ClassificationReason, ComplexityPolicy, DEFAULT_MAX_ITERATIONS,
    LoopOutcome, LoopPhase, LoopState, ObservationCheck, ParsedToolCalls, TaskComplexity,
    TaskComplexityClassifier, discard_fabricated_observation, extract_final_answer,
    extract_thinking, extract_tool_calls, parse_tool_calls, strip_internal_reasoning, strip_markup,
};
pub use session::{
    entities::{Message, Role},
    options::GenerationOptions,
    stream::StreamEvent,
};
pub use tool::{
    DefaultToolValidator, ProviderError, RiskTier, ToolCall, ToolDefinition, ToolError,
    ToolParameter, ToolProvider, ToolResult, ToolResultMetadata, ToolSpec, ToolValidator,
};
