//! Tool domain module
//!
//! Defines how the model's tool requests are described, invoked and answered:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (registry)   │    │ (request)    │    │ (observation)│
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │
//!        ├─ aliases: "bash" → "execute_command"
//!        └─ tools:   "execute_command" → ToolDefinition { risk_tier, .. }
//! ```
//!
//! # Risk tiers
//!
//! | Tier | Examples | Behavior |
//! |------|----------|----------|
//! | **Safe** | `read_file`, `list_directory`, `system_info` | Executed directly |
//! | **NeedsApproval** | `write_file`, `execute_command` | Held until the user answers yes/no |
//!
//! The tier is consumed by [`crate::permission::PermissionGuard`]. Execution
//! itself lives behind the application layer's `ToolExecutorPort`.

pub mod entities;
pub mod provider;
pub mod traits;
pub mod value_objects;

pub use entities::{RiskTier, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use provider::{ProviderError, ToolProvider};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult, ToolResultMetadata};
