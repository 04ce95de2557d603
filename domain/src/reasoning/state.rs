//! Reasoning loop state and outcomes.

use crate::permission::ApprovalRequest;
use crate::session::entities::Message;
use crate::tool::value_objects::ToolResult;

/// Default iteration budget for one loop invocation
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Mutable state of one loop invocation.
///
/// Created at loop entry and discarded at exit; only `conversation` is
/// handed back to the caller.
#[derive(Debug, Clone)]
pub struct LoopState {
    iteration: usize,
    max_iterations: usize,
    pub conversation: Vec<Message>,
    pub last_observation: Option<ToolResult>,
}

impl LoopState {
    pub fn new(conversation: Vec<Message>, max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            conversation,
            last_observation: None,
        }
    }

    /// Seed the state with an observation produced before the loop started
    /// (e.g. an approved tool that just ran).
    pub fn with_observation(mut self, observation: ToolResult) -> Self {
        self.last_observation = Some(observation);
        self
    }

    /// Start the next iteration. Returns `false` once the budget is spent;
    /// the counter never exceeds `max_iterations`.
    pub fn begin_iteration(&mut self) -> bool {
        if self.iteration >= self.max_iterations {
            return false;
        }
        self.iteration += 1;
        true
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn is_exhausted(&self) -> bool {
        self.iteration >= self.max_iterations
    }

    pub fn push(&mut self, message: Message) {
        self.conversation.push(message);
    }

    pub fn record_observation(&mut self, observation: ToolResult) {
        self.last_observation = Some(observation);
    }

    pub fn into_conversation(self) -> Vec<Message> {
        self.conversation
    }
}

/// Named states of the reasoning loop, reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Classify,
    SimpleResponse,
    QueryModel,
    Parse,
    PermissionCheck,
    Execute,
    ContinueReasoning,
    FinalAnswer,
    AwaitingApproval,
    MaxIterationsReached,
}

impl LoopPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopPhase::Classify => "classify",
            LoopPhase::SimpleResponse => "simple_response",
            LoopPhase::QueryModel => "query_model",
            LoopPhase::Parse => "parse",
            LoopPhase::PermissionCheck => "permission_check",
            LoopPhase::Execute => "execute",
            LoopPhase::ContinueReasoning => "continue_reasoning",
            LoopPhase::FinalAnswer => "final_answer",
            LoopPhase::AwaitingApproval => "awaiting_approval",
            LoopPhase::MaxIterationsReached => "max_iterations_reached",
        }
    }
}

/// How a loop invocation ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// Single-shot answer for a simple query
    SimpleResponse { text: String, thinking: Option<String> },
    /// The model produced `Final Answer:` (after the observation cross-check)
    FinalAnswer {
        text: String,
        thinking: Option<String>,
        /// The cross-check replaced the model's answer with a tool failure
        tool_failed: bool,
    },
    /// A risky tool call is waiting for the user's yes/no
    AwaitingApproval(ApprovalRequest),
    /// A tool call was refused outright
    Denied { message: String },
    /// The iteration budget ran out
    LimitReached { message: String },
}

impl LoopOutcome {
    /// Text shown to the user for this outcome
    pub fn text(&self) -> &str {
        match self {
            LoopOutcome::SimpleResponse { text, .. } | LoopOutcome::FinalAnswer { text, .. } => {
                text
            }
            LoopOutcome::AwaitingApproval(request) => &request.prompt,
            LoopOutcome::Denied { message } | LoopOutcome::LimitReached { message } => message,
        }
    }

    pub fn thinking(&self) -> Option<&str> {
        match self {
            LoopOutcome::SimpleResponse { thinking, .. }
            | LoopOutcome::FinalAnswer { thinking, .. } => thinking.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_never_exceeds_budget() {
        let mut state = LoopState::new(Vec::new(), 3);
        let mut started = 0;
        while state.begin_iteration() {
            started += 1;
        }
        assert_eq!(started, 3);
        assert_eq!(state.iteration(), 3);
        assert!(state.is_exhausted());
        assert!(!state.begin_iteration());
        assert_eq!(state.iteration(), 3);
    }

    #[test]
    fn test_zero_budget_never_starts() {
        let mut state = LoopState::new(Vec::new(), 0);
        assert!(!state.begin_iteration());
    }

    #[test]
    fn test_conversation_round_trip() {
        let mut state = LoopState::new(vec![Message::user("hi")], 5)
            .with_observation(ToolResult::success("read_file", "x"));
        state.push(Message::assistant("hello"));

        assert_eq!(state.last_observation.as_ref().unwrap().text, "x");
        let conversation = state.into_conversation();
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_outcome_text() {
        let outcome = LoopOutcome::LimitReached {
            message: "limit".into(),
        };
        assert_eq!(outcome.text(), "limit");
        assert_eq!(outcome.thinking(), None);

        let answer = LoopOutcome::FinalAnswer {
            text: "done".into(),
            thinking: Some("hmm".into()),
            tool_failed: false,
        };
        assert_eq!(answer.text(), "done");
        assert_eq!(answer.thinking(), Some("hmm"));
    }
}
