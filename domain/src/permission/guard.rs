//! Tool permission gate.
//!
//! Decides per tool call whether it may run now, must wait for the user's
//! yes/no, or is refused. Holds at most one [`PendingApproval`]; one guard
//! exists per conversation so sessions never see each other's requests.

use crate::core::string::truncate;
use crate::tool::entities::{RiskTier, ToolCall, ToolSpec};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Maximum length of the argument preview shown in approval prompts
const ARGUMENT_PREVIEW_LEN: usize = 300;

/// A risky tool call waiting for the user's decision
#[derive(Debug, Clone)]
pub struct PendingApproval {
    pub call: ToolCall,
    pub requested_at: Instant,
}

/// The message shown to the user when approval is needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub tool_name: String,
    pub arguments_preview: String,
    pub prompt: String,
}

impl ApprovalRequest {
    pub fn for_call(call: &ToolCall) -> Self {
        let arguments_preview = truncate(&call.render_arguments(), ARGUMENT_PREVIEW_LEN);
        let shown_args = if arguments_preview.is_empty() {
            "(none)".to_string()
        } else {
            arguments_preview.clone()
        };
        let prompt = format!(
            "⚠️ Permission required\n\nI want to run: {}\nArguments: {}\n\nShould I proceed? Type 'yes' or 'no'.",
            call.name, shown_args
        );
        Self {
            tool_name: call.name.clone(),
            arguments_preview,
            prompt,
        }
    }
}

/// Result of [`PermissionGuard::check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Run the tool now
    Approved,
    /// A pending approval was recorded; stop and wait for the next user turn
    AwaitingApproval(ApprovalRequest),
    /// Refused; the turn ends with `reason`
    Denied { reason: String },
}

/// Result of [`PermissionGuard::resolve`]
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalResolution {
    /// "yes"/"y": the stored call, arguments intact, ready to execute
    Approved(ToolCall),
    /// "no"/"n": the stored call was dropped
    Rejected(ToolCall),
    /// Anything else; the pending call remains
    Unrecognized,
    /// No call was waiting
    NothingPending,
    /// The pending call was older than the approval timeout and was dropped
    Expired(ToolCall),
}

/// Per-conversation permission gate
#[derive(Debug, Clone, Default)]
pub struct PermissionGuard {
    pending: Option<PendingApproval>,
    denied: HashSet<String>,
    timeout: Option<Duration>,
}

impl PermissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tools that are always refused
    pub fn with_denied(mut self, tools: impl IntoIterator<Item = String>) -> Self {
        self.denied.extend(tools);
        self
    }

    /// Drop pending approvals older than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Classify a requested call against the registry's risk tiers.
    ///
    /// Unregistered tools are approved; the executor reports them as unknown.
    pub fn check(&mut self, spec: &ToolSpec, call: &ToolCall) -> PermissionDecision {
        let canonical = spec.resolve(&call.name).unwrap_or(&call.name);
        if self.denied.contains(canonical) || self.denied.contains(&call.name) {
            return PermissionDecision::Denied {
                reason: format!("The tool '{}' is not allowed.", call.name),
            };
        }

        match spec.risk_tier(&call.name) {
            None | Some(RiskTier::Safe) => PermissionDecision::Approved,
            Some(RiskTier::NeedsApproval) => {
                self.expire_stale(Instant::now());
                if let Some(existing) = &self.pending {
                    return PermissionDecision::Denied {
                        reason: format!(
                            "Another approval is already pending ({}). Please answer it first.",
                            existing.call.name
                        ),
                    };
                }

                let request = ApprovalRequest::for_call(call);
                self.pending = Some(PendingApproval {
                    call: call.clone(),
                    requested_at: Instant::now(),
                });
                PermissionDecision::AwaitingApproval(request)
            }
        }
    }

    /// Apply the user's reply to the pending approval.
    pub fn resolve(&mut self, reply: &str) -> ApprovalResolution {
        let Some(pending) = self.pending.take() else {
            return ApprovalResolution::NothingPending;
        };

        if self.is_stale(&pending, Instant::now()) {
            return ApprovalResolution::Expired(pending.call);
        }

        match reply.trim().to_lowercase().as_str() {
            "yes" | "y" => ApprovalResolution::Approved(pending.call),
            "no" | "n" => ApprovalResolution::Rejected(pending.call),
            _ => {
                self.pending = Some(pending);
                ApprovalResolution::Unrecognized
            }
        }
    }

    pub fn pending(&self) -> Option<&PendingApproval> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending approval (e.g. when the conversation is reset)
    pub fn clear(&mut self) {
        self.pending = None;
    }

    fn is_stale(&self, pending: &PendingApproval, now: Instant) -> bool {
        self.timeout
            .is_some_and(|timeout| now.duration_since(pending.requested_at) >= timeout)
    }

    fn expire_stale(&mut self, now: Instant) {
        if self.pending.as_ref().is_some_and(|p| self.is_stale(p, now)) {
            self.pending = None;
        }
    }
}
