//! Permission domain: the human approval gate for risky tools.

pub mod guard;

pub use guard::{
    ApprovalRequest, ApprovalResolution, PendingApproval, PermissionDecision, PermissionGuard,
};
