//! Reasoning progress port.
//!
//! [`ReasoningProgressNotifier`] is an **output port** that the presentation
//! layer implements to show what the loop is doing while the user waits.
//! All methods have default no-op implementations, so implementers only
//! need to override the callbacks they care about.

use toolgate_domain::{ApprovalRequest, LoopPhase, TaskComplexity};

/// Progress notifier for the reasoning loop.
pub trait ReasoningProgressNotifier: Send + Sync {
    /// Called once the query has been classified
    fn on_classified(&self, _complexity: TaskComplexity) {}

    /// Called when the loop transitions to a new phase
    fn on_phase_change(&self, _phase: LoopPhase) {}

    /// Called at the start of every reasoning cycle (1-based)
    fn on_iteration_start(&self, _iteration: usize, _max_iterations: usize) {}

    /// Called when a tool is invoked
    fn on_tool_call(&self, _tool_name: &str, _args_preview: &str) {}

    /// Called when a tool returns a result
    fn on_tool_result(&self, _tool_name: &str, _success: bool, _duration_ms: Option<u64>) {}

    /// Called when a risky tool call has been parked for approval
    fn on_approval_requested(&self, _request: &ApprovalRequest) {}

    // ==================== LLM Streaming Callbacks ====================

    /// Called when a model call begins.
    fn on_llm_stream_start(&self) {}

    /// Called for each text chunk received during streaming.
    fn on_llm_chunk(&self, _chunk: &str) {}

    /// Called when a model call ends (successfully or not).
    fn on_llm_stream_end(&self) {}

    /// Called when the invocation ends, whatever the outcome
    fn on_finished(&self) {}
}

/// No-op implementation for when progress isn't needed
pub struct NoReasoningProgress;

impl ReasoningProgressNotifier for NoReasoningProgress {}
