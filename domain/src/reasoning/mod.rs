//! The ReAct reasoning domain.
//!
//! Pure building blocks of the think/act/observe loop:
//!
//! - [`complexity`] — decides between a single-shot answer and the loop
//! - [`parsing`] — extracts tool calls, final answers and reasoning from model text
//! - [`observation`] — cross-checks a claimed final answer against the last observation
//! - [`state`] — per-invocation loop state and its outcomes
//!
//! The loop itself (model calls, tool execution) lives in the application layer.

pub mod complexity;
pub mod observation;
pub mod parsing;
pub mod state;

pub use complexity::{
    Classification, ClassificationReason, ComplexityPolicy, TaskComplexity,
    TaskComplexityClassifier,
};
pub use observation::{AnswerVerdict, ObservationCheck};
pub use parsing::{
    ParsedToolCalls, discard_fabricated_observation, extract_final_answer, extract_thinking,
    extract_tool_calls, parse_tool_calls, strip_internal_reasoning, strip_markup,
};
pub use state::{DEFAULT_MAX_ITERATIONS, LoopOutcome, LoopPhase, LoopState};
