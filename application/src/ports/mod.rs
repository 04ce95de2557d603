//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod chat_ui;
pub mod composite_progress;
pub mod conversation_logger;
pub mod llm_gateway;
pub mod reasoning_progress;
pub mod tool_executor;
