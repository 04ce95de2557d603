//! JSON-RPC tool subprocess adapter
//!
//! Launches an external tool server and exposes its tools through
//! [`ToolProvider`](toolgate_domain::tool::ToolProvider).

pub mod client;
pub mod error;
pub mod protocol;
pub mod provider;

pub use client::JsonRpcClient;
pub use error::McpError;
pub use provider::{JSONRPC_PRIORITY, JsonRpcProviderConfig, JsonRpcToolProvider};
