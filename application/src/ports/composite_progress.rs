//! Composite progress notifier: delegates to multiple notifiers.
//!
//! Used to fan out loop events to both the terminal progress reporter and
//! the chat UI's token stream.

use super::reasoning_progress::ReasoningProgressNotifier;
use toolgate_domain::{ApprovalRequest, LoopPhase, TaskComplexity};

/// A progress notifier that delegates to multiple inner notifiers.
///
/// ```text
/// ReasoningLoopUseCase::run(.., &composite)
///                 |
///     +-----------+-------------+
///     |                         |
/// ProgressReporter        UiTokenForwarder
/// (spinner, tool lines)   → ChatUiPort::stream_token()
/// ```
pub struct CompositeProgressNotifier<'a> {
    delegates: Vec<&'a dyn ReasoningProgressNotifier>,
}

impl<'a> CompositeProgressNotifier<'a> {
    pub fn new(delegates: Vec<&'a dyn ReasoningProgressNotifier>) -> Self {
        Self { delegates }
    }
}

/// Macro to delegate a method call to all inner notifiers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl ReasoningProgressNotifier for CompositeProgressNotifier<'_> {
    fn on_classified(&self, complexity: TaskComplexity) {
        delegate!(self, on_classified, complexity);
    }

    fn on_phase_change(&self, phase: LoopPhase) {
        delegate!(self, on_phase_change, phase);
    }

    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        delegate!(self, on_iteration_start, iteration, max_iterations);
    }

    fn on_tool_call(&self, tool_name: &str, args_preview: &str) {
        delegate!(self, on_tool_call, tool_name, args_preview);
    }

    fn on_tool_result(&self, tool_name: &str, success: bool, duration_ms: Option<u64>) {
        delegate!(self, on_tool_result, tool_name, success, duration_ms);
    }

    fn on_approval_requested(&self, request: &ApprovalRequest) {
        delegate!(self, on_approval_requested, request);
    }

    fn on_llm_stream_start(&self) {
        delegate!(self, on_llm_stream_start);
    }

    fn on_llm_chunk(&self, chunk: &str) {
        delegate!(self, on_llm_chunk, chunk);
    }

    fn on_llm_stream_end(&self) {
        delegate!(self, on_llm_stream_end);
    }

    fn on_finished(&self) {
        delegate!(self, on_finished);
    }
}
