//! Handle Message use case
//!
//! One inbound user message on a [`ChatSession`]. If an approval is pending,
//! the message is first read as the yes/no answer; otherwise (or once an
//! expired approval is dropped) it is a new query for the reasoning loop.
//! The reply always reaches the user through [`ChatUiPort`], and the caller
//! gets a [`TurnReply`] describing how the turn ended.

use crate::ports::chat_ui::{ChatUiPort, UiMessage, UiMessageKind};
use crate::ports::composite_progress::CompositeProgressNotifier;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::reasoning_progress::ReasoningProgressNotifier;
use crate::use_cases::reasoning_loop::{ReasoningError, ReasoningLoopUseCase};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use toolgate_domain::{ApprovalResolution, LoopOutcome, Message, PermissionGuard};
use tracing::{debug, info, warn};

/// Reply when the user rejects a pending tool call
pub const CANCELLED_REPLY: &str = "Operation cancelled.";
/// Reply when the answer to an approval prompt is neither yes nor no
pub const YES_NO_REMINDER: &str = "Please respond with 'yes' or 'no'.";

/// Upper bound on approval prompts answered within one single-shot run
const MAX_APPROVAL_ROUNDS: usize = 10;

/// Per-conversation state: history and the pending approval.
///
/// Sessions share nothing mutable, so separate conversations can be served
/// concurrently.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    conversation: Vec<Message>,
    guard: PermissionGuard,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, guard: PermissionGuard) -> Self {
        Self {
            id: id.into(),
            conversation: Vec::new(),
            guard,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    pub fn guard(&self) -> &PermissionGuard {
        &self.guard
    }

    pub fn has_pending_approval(&self) -> bool {
        self.guard.has_pending()
    }

    /// Forget the history and any pending approval
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.guard.clear();
    }
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnReplyKind {
    Answer,
    ApprovalRequested,
    LimitReached,
    Cancelled,
    Error,
    Denied,
}

/// What the user was told at the end of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub text: String,
    pub kind: TurnReplyKind,
    pub thinking: Option<String>,
}

impl TurnReply {
    fn new(kind: TurnReplyKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            thinking: None,
        }
    }

    pub fn awaits_approval(&self) -> bool {
        self.kind == TurnReplyKind::ApprovalRequested
    }
}

/// Forwards streamed model tokens to the chat UI
struct UiTokenForwarder<'a> {
    ui: &'a dyn ChatUiPort,
}

impl ReasoningProgressNotifier for UiTokenForwarder<'_> {
    fn on_llm_chunk(&self, chunk: &str) {
        self.ui.stream_token(chunk);
    }
}

/// Use case for one chat turn
pub struct HandleMessageUseCase {
    reasoning: ReasoningLoopUseCase,
    ui: Arc<dyn ChatUiPort>,
    logger: Arc<dyn ConversationLogger>,
}

impl HandleMessageUseCase {
    pub fn new(reasoning: ReasoningLoopUseCase, ui: Arc<dyn ChatUiPort>) -> Self {
        Self {
            reasoning,
            ui,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn reasoning(&self) -> &ReasoningLoopUseCase {
        &self.reasoning
    }

    /// A fresh session carrying the configured approval timeout
    pub fn new_session(&self, id: impl Into<String>, guard: PermissionGuard) -> ChatSession {
        let guard = match self.reasoning.params().approval_timeout {
            Some(timeout) => guard.with_timeout(timeout),
            None => guard,
        };
        ChatSession::new(id, guard)
    }

    /// Process one inbound message and deliver the reply.
    pub async fn execute(
        &self,
        session: &mut ChatSession,
        message: &str,
        progress: &dyn ReasoningProgressNotifier,
    ) -> TurnReply {
        self.logger.log(ConversationEvent::new(
            event_types::USER_MESSAGE,
            json!({ "session": session.id, "text": message }),
        ));

        let forwarder = UiTokenForwarder {
            ui: self.ui.as_ref(),
        };
        let delegates: Vec<&dyn ReasoningProgressNotifier> = vec![progress, &forwarder];
        let progress = CompositeProgressNotifier::new(delegates);

        let result = if session.guard.has_pending() {
            match session.guard.resolve(message) {
                ApprovalResolution::Approved(call) => {
                    info!(session = %session.id, tool = %call.name, "Approval granted");
                    self.log_resolution(&call.name, "approved");
                    self.reasoning
                        .continue_after_approval(
                            &call,
                            &mut session.conversation,
                            &mut session.guard,
                            &progress,
                        )
                        .await
                }
                ApprovalResolution::Rejected(call) => {
                    info!(session = %session.id, tool = %call.name, "Approval rejected");
                    self.log_resolution(&call.name, "rejected");
                    session.conversation.push(Message::user(format!(
                        "The user declined to run {}.",
                        call.name
                    )));
                    session
                        .conversation
                        .push(Message::assistant(CANCELLED_REPLY));
                    return self
                        .deliver(TurnReply::new(TurnReplyKind::Cancelled, CANCELLED_REPLY))
                        .await;
                }
                ApprovalResolution::Unrecognized => {
                    debug!(session = %session.id, "Unrecognized approval reply");
                    return self
                        .deliver(TurnReply::new(
                            TurnReplyKind::ApprovalRequested,
                            YES_NO_REMINDER,
                        ))
                        .await;
                }
                ApprovalResolution::Expired(call) => {
                    info!(session = %session.id, tool = %call.name, "Pending approval expired");
                    self.log_resolution(&call.name, "expired");
                    self.run_query(session, message, &progress).await
                }
                ApprovalResolution::NothingPending => {
                    self.run_query(session, message, &progress).await
                }
            }
        } else {
            self.run_query(session, message, &progress).await
        };

        let reply = match result {
            Ok(outcome) => Self::reply_for(outcome),
            Err(e) => self.reply_for_error(session, e),
        };
        self.deliver(reply).await
    }

    /// Single-shot mode: run `query` and answer any approval prompts through
    /// [`ChatUiPort::ask_yes_no`]. A timeout or UI failure counts as "no".
    pub async fn execute_to_completion(
        &self,
        session: &mut ChatSession,
        query: &str,
        approval_timeout: Duration,
        progress: &dyn ReasoningProgressNotifier,
    ) -> TurnReply {
        let mut reply = self.execute(session, query, progress).await;
        let mut rounds = 0;

        while reply.awaits_approval() {
            rounds += 1;
            let answer = if rounds > MAX_APPROVAL_ROUNDS {
                warn!("Too many approval prompts in one run, declining");
                "no".to_string()
            } else {
                match self.ui.ask_yes_no(&reply.text, approval_timeout).await {
                    Ok(Some(answer)) => answer,
                    Ok(None) => {
                        info!("Approval prompt timed out");
                        "no".to_string()
                    }
                    Err(e) => {
                        warn!(error = %e, "Approval prompt failed");
                        "no".to_string()
                    }
                }
            };
            reply = self.execute(session, &answer, progress).await;
        }
        reply
    }

    async fn run_query(
        &self,
        session: &mut ChatSession,
        query: &str,
        progress: &dyn ReasoningProgressNotifier,
    ) -> Result<LoopOutcome, ReasoningError> {
        self.reasoning
            .run(query, &mut session.conversation, &mut session.guard, progress)
            .await
    }

    fn reply_for(outcome: LoopOutcome) -> TurnReply {
        match outcome {
            LoopOutcome::SimpleResponse { text, thinking } => TurnReply {
                text,
                kind: TurnReplyKind::Answer,
                thinking,
            },
            LoopOutcome::FinalAnswer { text, thinking, .. } => TurnReply {
                text,
                kind: TurnReplyKind::Answer,
                thinking,
            },
            LoopOutcome::AwaitingApproval(request) => {
                TurnReply::new(TurnReplyKind::ApprovalRequested, request.prompt)
            }
            LoopOutcome::Denied { message } => TurnReply::new(TurnReplyKind::Denied, message),
            LoopOutcome::LimitReached { message } => {
                TurnReply::new(TurnReplyKind::LimitReached, message)
            }
        }
    }

    fn reply_for_error(&self, session: &ChatSession, error: ReasoningError) -> TurnReply {
        if error.is_cancelled() {
            return TurnReply::new(TurnReplyKind::Cancelled, CANCELLED_REPLY);
        }
        warn!(session = %session.id, error = %error, "Turn failed");
        self.logger.log(ConversationEvent::new(
            event_types::TURN_ERROR,
            json!({ "session": session.id, "error": error.to_string() }),
        ));
        TurnReply::new(
            TurnReplyKind::Error,
            format!("I encountered an error: {}", error),
        )
    }

    /// Send thinking (if any) then the reply itself. UI failures are logged;
    /// the reply is returned either way.
    async fn deliver(&self, reply: TurnReply) -> TurnReply {
        if let Some(thinking) = &reply.thinking
            && let Err(e) = self.ui.send(UiMessage::thinking(thinking.clone())).await
        {
            warn!(error = %e, "Failed to show thinking");
        }

        let kind = match reply.kind {
            TurnReplyKind::Answer => UiMessageKind::Answer,
            TurnReplyKind::ApprovalRequested => UiMessageKind::ApprovalRequest,
            TurnReplyKind::Error => UiMessageKind::Error,
            TurnReplyKind::LimitReached | TurnReplyKind::Cancelled | TurnReplyKind::Denied => {
                UiMessageKind::Notice
            }
        };
        if let Err(e) = self.ui.send(UiMessage::new(kind, reply.text.clone())).await {
            warn!(error = %e, "Failed to deliver reply");
        }
        reply
    }

    fn log_resolution(&self, tool: &str, decision: &str) {
        self.logger.log(ConversationEvent::new(
            event_types::APPROVAL_RESOLVED,
            json!({ "tool": tool, "decision": decision }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_ui::ChatUiError;
    use crate::ports::llm_gateway::{GatewayError, LlmGateway};
    use crate::ports::reasoning_progress::NoReasoningProgress;
    use crate::ports::tool_executor::ToolExecutorPort;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use toolgate_domain::{
        GenerationOptions, RiskTier, ToolCall, ToolDefinition, ToolResult, ToolSpec,
    };

    // ==================== Test Mocks ====================

    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<String, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(VecDeque::from(responses)),
            })
        }

        fn replying(texts: &[&str]) -> Arc<Self> {
            Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _messages: &[Message],
            _options: &GenerationOptions,
        ) -> Result<String, GatewayError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("No more responses".to_string())))
        }
    }

    struct RecordingTools {
        spec: ToolSpec,
        executed: Mutex<Vec<ToolCall>>,
    }

    impl RecordingTools {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                spec: ToolSpec::new()
                    .register(ToolDefinition::new("list_directory", "List", RiskTier::Safe))
                    .register(ToolDefinition::new(
                        "write_file",
                        "Write",
                        RiskTier::NeedsApproval,
                    )),
                executed: Mutex::new(Vec::new()),
            })
        }

        fn executed(&self) -> usize {
            self.executed.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ToolExecutorPort for RecordingTools {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, call: &ToolCall) -> ToolResult {
            self.executed.lock().unwrap().push(call.clone());
            ToolResult::success(&call.name, "Wrote 5 bytes to a.txt")
        }
    }

    struct RecordingUi {
        sent: Mutex<Vec<UiMessage>>,
        tokens: Mutex<String>,
        answers: Mutex<VecDeque<Option<String>>>,
    }

    impl RecordingUi {
        fn new(answers: Vec<Option<&str>>) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                tokens: Mutex::new(String::new()),
                answers: Mutex::new(answers.into_iter().map(|a| a.map(String::from)).collect()),
            })
        }

        fn kinds(&self) -> Vec<UiMessageKind> {
            self.sent.lock().unwrap().iter().map(|m| m.kind).collect()
        }
    }

    #[async_trait]
    impl ChatUiPort for RecordingUi {
        async fn send(&self, message: UiMessage) -> Result<(), ChatUiError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        fn stream_token(&self, token: &str) {
            self.tokens.lock().unwrap().push_str(token);
        }

        async fn ask_yes_no(
            &self,
            _prompt: &str,
            _timeout: Duration,
        ) -> Result<Option<String>, ChatUiError> {
            Ok(self.answers.lock().unwrap().pop_front().flatten())
        }
    }

    const WRITE_CALL: &str =
        r#"<tool_call>{"name":"write_file","arguments":{"path":"a.txt","content":"hello"}}</tool_call>"#;

    fn handler(
        gateway: Arc<ScriptedGateway>,
        tools: Arc<RecordingTools>,
        ui: Arc<RecordingUi>,
    ) -> HandleMessageUseCase {
        HandleMessageUseCase::new(ReasoningLoopUseCase::new(gateway, tools), ui)
    }

    #[tokio::test]
    async fn test_simple_answer_is_delivered() {
        let ui = RecordingUi::new(vec![]);
        let uc = handler(
            ScriptedGateway::replying(&["<think>easy</think>Paris."]),
            RecordingTools::new(),
            ui.clone(),
        );
        let mut session = uc.new_session("s1", PermissionGuard::new());

        let reply = uc.execute(&mut session, "Capital of France?", &NoReasoningProgress).await;

        assert_eq!(reply.kind, TurnReplyKind::Answer);
        assert_eq!(reply.text, "Paris.");
        assert_eq!(ui.kinds(), vec![UiMessageKind::Thinking, UiMessageKind::Answer]);
        // streamed tokens reach the UI
        assert!(ui.tokens.lock().unwrap().contains("Paris."));
    }

    #[tokio::test]
    async fn test_approval_flow_across_turns() {
        let tools = RecordingTools::new();
        let ui = RecordingUi::new(vec![]);
        let uc = handler(
            ScriptedGateway::replying(&[WRITE_CALL, "Final Answer: Saved."]),
            tools.clone(),
            ui.clone(),
        );
        let mut session = uc.new_session("s1", PermissionGuard::new());

        let first = uc
            .execute(&mut session, "Write hello to a.txt", &NoReasoningProgress)
            .await;
        assert_eq!(first.kind, TurnReplyKind::ApprovalRequested);
        assert!(first.text.contains("write_file"));
        assert!(session.has_pending_approval());
        assert_eq!(tools.executed(), 0);

        let unclear = uc.execute(&mut session, "hmm", &NoReasoningProgress).await;
        assert_eq!(unclear.text, YES_NO_REMINDER);
        assert!(session.has_pending_approval());

        let done = uc.execute(&mut session, "Yes", &NoReasoningProgress).await;
        assert_eq!(done.kind, TurnReplyKind::Answer);
        assert!(done.text.contains("Saved."));
        assert_eq!(tools.executed(), 1);
        assert!(!session.has_pending_approval());
    }

    #[tokio::test]
    async fn test_rejection_cancels() {
        let tools = RecordingTools::new();
        let uc = handler(
            ScriptedGateway::replying(&[WRITE_CALL]),
            tools.clone(),
            RecordingUi::new(vec![]),
        );
        let mut session = uc.new_session("s1", PermissionGuard::new());

        uc.execute(&mut session, "Write hello to a.txt", &NoReasoningProgress).await;
        let reply = uc.execute(&mut session, "no", &NoReasoningProgress).await;

        assert_eq!(reply.kind, TurnReplyKind::Cancelled);
        assert_eq!(reply.text, CANCELLED_REPLY);
        assert_eq!(tools.executed(), 0);
        assert!(!session.has_pending_approval());
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_pending_approvals() {
        let uc = handler(
            ScriptedGateway::replying(&[WRITE_CALL, "Hello!"]),
            RecordingTools::new(),
            RecordingUi::new(vec![]),
        );
        let mut alice = uc.new_session("alice", PermissionGuard::new());
        let mut bob = uc.new_session("bob", PermissionGuard::new());

        uc.execute(&mut alice, "Write hello to a.txt", &NoReasoningProgress).await;
        let reply = uc.execute(&mut bob, "yes", &NoReasoningProgress).await;

        assert!(alice.has_pending_approval());
        assert!(!bob.has_pending_approval());
        // "yes" was a plain query for bob
        assert_eq!(reply.text, "Hello!");
    }

    #[tokio::test]
    async fn test_expired_approval_treats_message_as_new_query() {
        let tools = RecordingTools::new();
        let uc = handler(
            ScriptedGateway::replying(&[WRITE_CALL, "Fresh answer"]),
            tools.clone(),
            RecordingUi::new(vec![]),
        );
        let mut session =
            ChatSession::new("s1", PermissionGuard::new().with_timeout(Duration::ZERO));

        uc.execute(&mut session, "Write hello to a.txt", &NoReasoningProgress).await;
        let reply = uc.execute(&mut session, "yes", &NoReasoningProgress).await;

        assert_eq!(reply.text, "Fresh answer");
        assert_eq!(tools.executed(), 0);
        assert!(!session.has_pending_approval());
    }

    #[tokio::test]
    async fn test_backend_error_is_reported() {
        let ui = RecordingUi::new(vec![]);
        let uc = handler(
            ScriptedGateway::new(vec![Err(GatewayError::ConnectionError("refused".into()))]),
            RecordingTools::new(),
            ui.clone(),
        );
        let mut session = uc.new_session("s1", PermissionGuard::new());

        let reply = uc.execute(&mut session, "Hi", &NoReasoningProgress).await;

        assert_eq!(reply.kind, TurnReplyKind::Error);
        assert_eq!(reply.text, "I encountered an error: Connection error: refused");
        assert_eq!(ui.kinds(), vec![UiMessageKind::Error]);
        // the user message survives for the next turn
        assert_eq!(session.conversation().last().unwrap().content, "Hi");
    }

    #[tokio::test]
    async fn test_single_shot_asks_and_executes() {
        let tools = RecordingTools::new();
        let uc = handler(
            ScriptedGateway::replying(&[WRITE_CALL, "Final Answer: Saved."]),
            tools.clone(),
            RecordingUi::new(vec![Some("y")]),
        );
        let mut session = uc.new_session("cli", PermissionGuard::new());

        let reply = uc
            .execute_to_completion(
                &mut session,
                "Write hello to a.txt",
                Duration::from_secs(1),
                &NoReasoningProgress,
            )
            .await;

        assert_eq!(reply.kind, TurnReplyKind::Answer);
        assert_eq!(tools.executed(), 1);
    }

    #[tokio::test]
    async fn test_single_shot_timeout_counts_as_no() {
        let tools = RecordingTools::new();
        let uc = handler(
            ScriptedGateway::replying(&[WRITE_CALL]),
            tools.clone(),
            RecordingUi::new(vec![None]),
        );
        let mut session = uc.new_session("cli", PermissionGuard::new());

        let reply = uc
            .execute_to_completion(
                &mut session,
                "Write hello to a.txt",
                Duration::from_millis(10),
                &NoReasoningProgress,
            )
            .await;

        assert_eq!(reply.kind, TurnReplyKind::Cancelled);
        assert_eq!(tools.executed(), 0);
    }

    #[tokio::test]
    async fn test_reset_clears_history_and_pending() {
        let uc = handler(
            ScriptedGateway::replying(&[WRITE_CALL]),
            RecordingTools::new(),
            RecordingUi::new(vec![]),
        );
        let mut session = uc.new_session("s1", PermissionGuard::new());
        uc.execute(&mut session, "Write hello to a.txt", &NoReasoningProgress).await;

        session.reset();

        assert!(session.conversation().is_empty());
        assert!(!session.has_pending_approval());
    }
}
