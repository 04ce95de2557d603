//! Reasoning loop use case
//!
//! Runs one user query through the classify → answer flow:
//!
//! ```text
//! CLASSIFY ──simple──▶ SIMPLE_RESPONSE (one model call)
//!    │
//!  complex
//!    ▼
//! QUERY_MODEL ─▶ PARSE ─┬─ tool calls ─▶ PERMISSION_CHECK ─┬─ approved ─▶ EXECUTE ─▶ QUERY_MODEL
//!    ▲                  │                                  ├─ needs approval ─▶ AWAITING_APPROVAL
//!    │                  │                                  └─ denied ─▶ DENIED
//!    │                  ├─ Final Answer ─▶ cross-check ─▶ FINAL_ANSWER
//!    └── nudge ◀────────┘ neither
//! ```
//!
//! The cycle is bounded by `max_iterations`; running out yields an explicit
//! limit-reached message. Waiting for approval is not a suspension point:
//! the invocation returns and [`ReasoningLoopUseCase::continue_after_approval`]
//! picks the conversation up on the user's next message.

use crate::config::ReasoningParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::reasoning_progress::ReasoningProgressNotifier;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::shared::check_cancelled;
use crate::use_cases::tool_helpers::tool_args_preview;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use toolgate_domain::{
    AnswerVerdict, GenerationOptions, LoopOutcome, LoopPhase, LoopState, Message,
    ObservationCheck, PermissionDecision, PermissionGuard, ReactPromptTemplate,
    TaskComplexityClassifier, ToolCall, ToolResult, discard_fabricated_observation,
    extract_final_answer, extract_thinking, parse_tool_calls, strip_internal_reasoning,
};
use tracing::{debug, info, warn};

/// Errors that end a turn without an answer
#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error(transparent)]
    Backend(#[from] GatewayError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ReasoningError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReasoningError::Cancelled)
    }
}

/// Use case for answering one query with the ReAct loop
#[derive(Clone)]
pub struct ReasoningLoopUseCase {
    gateway: Arc<dyn LlmGateway>,
    tools: Arc<dyn ToolExecutorPort>,
    template: ReactPromptTemplate,
    params: ReasoningParams,
    options: GenerationOptions,
    classifier: TaskComplexityClassifier,
    check: ObservationCheck,
    logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl ReasoningLoopUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, tools: Arc<dyn ToolExecutorPort>) -> Self {
        let params = ReasoningParams::default();
        Self {
            gateway,
            tools,
            template: ReactPromptTemplate::default(),
            classifier: params.classifier(),
            check: params.observation_check(),
            params,
            options: GenerationOptions::default(),
            logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: ReasoningParams) -> Self {
        self.classifier = params.classifier();
        self.check = params.observation_check();
        self.params = params;
        self
    }

    pub fn with_template(mut self, template: ReactPromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &ReasoningParams {
        &self.params
    }

    pub fn tools(&self) -> &Arc<dyn ToolExecutorPort> {
        &self.tools
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    /// Answer `query` on top of `conversation`.
    ///
    /// `conversation` is updated in place with everything the model saw and
    /// said, including on error (history up to the failure is kept).
    pub async fn run(
        &self,
        query: &str,
        conversation: &mut Vec<Message>,
        guard: &mut PermissionGuard,
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<LoopOutcome, ReasoningError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ReasoningError::EmptyQuery);
        }
        self.ensure_system_prompt(conversation);

        progress.on_phase_change(LoopPhase::Classify);
        let classification = self.classifier.explain(query);
        debug!(
            complexity = %classification.complexity,
            reason = ?classification.reason,
            "Classified query"
        );
        self.logger.log(ConversationEvent::new(
            event_types::CLASSIFICATION,
            json!({
                "complexity": classification.complexity,
                "reason": format!("{:?}", classification.reason),
            }),
        ));
        progress.on_classified(classification.complexity);

        let result = if classification.complexity.is_complex() {
            conversation.push(Message::user(
                self.template.react_instructions(self.tools.tool_spec(), query),
            ));
            let state = LoopState::new(std::mem::take(conversation), self.params.max_iterations);
            self.drive(state, conversation, guard, progress).await
        } else {
            self.simple_response(query, conversation, progress).await
        };

        progress.on_finished();
        result
    }

    /// Execute a call the user just approved and resume the loop with a
    /// fresh iteration budget.
    pub async fn continue_after_approval(
        &self,
        call: &ToolCall,
        conversation: &mut Vec<Message>,
        guard: &mut PermissionGuard,
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<LoopOutcome, ReasoningError> {
        self.ensure_system_prompt(conversation);

        let observation = self.execute_tool(call, progress).await;
        conversation.push(Message::user(self.template.observation_message(&observation)));

        let state = LoopState::new(std::mem::take(conversation), self.params.max_iterations)
            .with_observation(observation);
        let result = self.drive(state, conversation, guard, progress).await;

        progress.on_finished();
        result
    }

    fn ensure_system_prompt(&self, conversation: &mut Vec<Message>) {
        if !conversation.first().is_some_and(Message::is_system) {
            conversation.insert(0, Message::system(self.template.system_prompt()));
        }
    }

    async fn simple_response(
        &self,
        query: &str,
        conversation: &mut Vec<Message>,
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<LoopOutcome, ReasoningError> {
        progress.on_phase_change(LoopPhase::SimpleResponse);
        conversation.push(Message::user(query));

        let raw = self.query_model(conversation, progress).await?;
        let text = strip_internal_reasoning(&raw, &self.params.empty_response_fallback);
        conversation.push(Message::assistant(text.clone()));

        self.log_final_answer(&text, false);
        Ok(LoopOutcome::SimpleResponse {
            text,
            thinking: extract_thinking(&raw),
        })
    }

    /// Run the iteration cycle and hand the conversation back whatever happens.
    async fn drive(
        &self,
        mut state: LoopState,
        conversation: &mut Vec<Message>,
        guard: &mut PermissionGuard,
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<LoopOutcome, ReasoningError> {
        let result = self.iterate(&mut state, guard, progress).await;
        *conversation = state.into_conversation();
        result
    }

    async fn iterate(
        &self,
        state: &mut LoopState,
        guard: &mut PermissionGuard,
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<LoopOutcome, ReasoningError> {
        let mut thinking: Option<String> = None;

        while state.begin_iteration() {
            let iteration = state.iteration();
            progress.on_iteration_start(iteration, state.max_iterations());
            debug!(iteration, max = state.max_iterations(), "Reasoning cycle");

            progress.on_phase_change(LoopPhase::QueryModel);
            let raw = self.query_model(&state.conversation, progress).await?;

            let (response, fabricated) = discard_fabricated_observation(&raw);
            if fabricated {
                warn!(iteration, "Discarded a model-written Observation");
            }
            state.push(Message::assistant(response.clone()));
            if let Some(t) = extract_thinking(&response) {
                thinking = Some(t);
            }

            progress.on_phase_change(LoopPhase::Parse);
            let parsed = parse_tool_calls(&response);
            for malformed in &parsed.malformed {
                warn!(iteration, reason = %malformed.reason, "Skipping malformed tool call");
            }

            if !parsed.calls.is_empty() {
                for call in &parsed.calls {
                    progress.on_phase_change(LoopPhase::PermissionCheck);
                    match guard.check(self.tools.tool_spec(), call) {
                        PermissionDecision::Approved => {
                            let observation = self.execute_tool(call, progress).await;
                            state.push(Message::user(
                                self.template.observation_message(&observation),
                            ));
                            state.record_observation(observation);
                        }
                        PermissionDecision::AwaitingApproval(request) => {
                            info!(tool = %call.name, "Tool call awaiting approval");
                            progress.on_phase_change(LoopPhase::AwaitingApproval);
                            progress.on_approval_requested(&request);
                            self.logger.log(ConversationEvent::new(
                                event_types::APPROVAL_REQUESTED,
                                json!({
                                    "tool": call.name,
                                    "arguments": call.arguments,
                                }),
                            ));
                            return Ok(LoopOutcome::AwaitingApproval(request));
                        }
                        PermissionDecision::Denied { reason } => {
                            info!(tool = %call.name, %reason, "Tool call denied");
                            return Ok(LoopOutcome::Denied { message: reason });
                        }
                    }
                }
                continue;
            }

            if let Some(answer) = extract_final_answer(&response) {
                progress.on_phase_change(LoopPhase::FinalAnswer);
                let verdict = self.check.review(&answer, state.last_observation.as_ref());
                let tool_failed = verdict.is_failure();
                if tool_failed {
                    warn!("Final answer overridden by a failed tool observation");
                }
                let text = match verdict {
                    AnswerVerdict::Confirmed(text) | AnswerVerdict::ToolFailed(text) => text,
                };
                let text = if text.trim().is_empty() {
                    self.params.empty_response_fallback.clone()
                } else {
                    text
                };

                self.log_final_answer(&text, tool_failed);
                return Ok(LoopOutcome::FinalAnswer {
                    text,
                    thinking,
                    tool_failed,
                });
            }

            progress.on_phase_change(LoopPhase::ContinueReasoning);
            let nudge = if parsed.malformed.is_empty() {
                self.template.continue_nudge()
            } else {
                let reasons: Vec<String> =
                    parsed.malformed.iter().map(|m| m.reason.clone()).collect();
                self.template.malformed_call_message(&reasons)
            };
            state.push(Message::user(nudge));
        }

        progress.on_phase_change(LoopPhase::MaxIterationsReached);
        warn!(max = state.max_iterations(), "Reasoning limit reached");
        Ok(LoopOutcome::LimitReached {
            message: self.template.limit_reached_message(state.max_iterations()),
        })
    }

    /// Run one tool call through the executor, reporting progress and
    /// logging the exchange. The result text is passed through untouched.
    async fn execute_tool(
        &self,
        call: &ToolCall,
        progress: &dyn ReasoningProgressNotifier,
    ) -> ToolResult {
        progress.on_phase_change(LoopPhase::Execute);
        progress.on_tool_call(&call.name, &tool_args_preview(call));
        self.logger.log(ConversationEvent::new(
            event_types::TOOL_CALL,
            json!({ "tool": call.name, "arguments": call.arguments }),
        ));

        let result = self.tools.execute(call).await;
        debug!(tool = %call.name, is_error = result.is_error, "Tool finished");

        progress.on_tool_result(&call.name, result.is_success(), result.metadata.duration_ms);
        self.logger.log(ConversationEvent::new(
            event_types::TOOL_RESULT,
            json!({
                "tool": result.tool_name,
                "is_error": result.is_error,
                "error_code": result.error_code,
                "text": result.text,
            }),
        ));
        result
    }

    /// One model call, honoring the model timeout and cancellation.
    async fn query_model(
        &self,
        messages: &[Message],
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<String, ReasoningError> {
        check_cancelled(&self.cancellation_token)?;
        self.logger.log(ConversationEvent::new(
            event_types::LLM_REQUEST,
            json!({
                "model": self.gateway.model_name(),
                "messages": messages.len(),
                "prompt": messages.last().map(|m| m.content.as_str()),
            }),
        ));

        progress.on_llm_stream_start();
        let call = self.call_backend(messages, progress);
        let result = match &self.cancellation_token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ReasoningError::Cancelled),
                    result = call => result,
                }
            }
            None => call.await,
        };
        progress.on_llm_stream_end();

        let text = result?;
        self.logger.log(ConversationEvent::new(
            event_types::LLM_RESPONSE,
            json!({ "model": self.gateway.model_name(), "text": text }),
        ));
        Ok(text)
    }

    async fn call_backend(
        &self,
        messages: &[Message],
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<String, ReasoningError> {
        let request = async {
            if self.params.stream {
                let handle = self.gateway.complete_streaming(messages, &self.options).await?;
                handle.forward(|chunk| progress.on_llm_chunk(chunk)).await
            } else {
                self.gateway.complete(messages, &self.options).await
            }
        };

        let text = match self.params.model_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| GatewayError::Timeout)??,
            None => request.await?,
        };
        Ok(text)
    }

    fn log_final_answer(&self, text: &str, tool_failed: bool) {
        self.logger.log(ConversationEvent::new(
            event_types::FINAL_ANSWER,
            json!({ "text": text, "tool_failed": tool_failed }),
        ));
    }
}
