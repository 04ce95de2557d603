//! Error types for the JSON-RPC tool subprocess

use thiserror::Error;

/// Result type alias for JSON-RPC tool server operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when talking to the tool subprocess
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Tool server command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn tool server: {0}")]
    SpawnError(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Tool server closed the connection")]
    TransportClosed,

    #[error("Tool server did not answer within {0} seconds")]
    Timeout(u64),
}

impl From<tokio_util::codec::LinesCodecError> for McpError {
    fn from(err: tokio_util::codec::LinesCodecError) -> Self {
        match err {
            tokio_util::codec::LinesCodecError::Io(e) => McpError::Io(e),
            other => McpError::Io(std::io::Error::other(other.to_string())),
        }
    }
}
