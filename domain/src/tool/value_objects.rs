//! Tool domain value objects — immutable result and error types
//!
//! Every tool execution produces a [`ToolResult`]: the text that becomes the
//! loop's Observation plus an `is_error` flag. Failures are values, not `Err`,
//! so the reasoning loop branches on them explicitly.

use serde::{Deserialize, Serialize};

/// Error that occurred during tool execution.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Missing/wrong parameters |
/// | `NOT_FOUND` | Missing file, directory or resource |
/// | `UNKNOWN_TOOL` | No tool registered under that name |
/// | `EXECUTION_FAILED` | Runtime failure (I/O error, subprocess error) |
/// | `PERMISSION_DENIED` | Access denied or outside the workspace |
/// | `TIMEOUT` | Operation timed out |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Not found: {}", resource.into()))
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::new("UNKNOWN_TOOL", format!("Unknown tool: {}", name.into()))
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            "PERMISSION_DENIED",
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            "TIMEOUT",
            format!("Operation timed out: {}", operation.into()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution.
///
/// `text` is the literal observation handed back to the model; the loop
/// never edits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Observation text (output on success, error message on failure)
    pub text: String,
    /// Whether the execution failed
    pub is_error: bool,
    /// Error code for failed executions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Metadata about the execution
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about tool execution, used for progress display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Number of bytes processed/returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// For file operations: the affected path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// For command execution: exit code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            text: output.into(),
            is_error: false,
            error_code: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Create a failed result; the text carries the error message
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            text: format!("Error: {}", error.message),
            is_error: true,
            error_code: Some(error.code),
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Add metadata to the result
    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add duration metadata
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    /// Add path metadata
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.metadata.path = Some(path.into());
        self
    }

    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        !self.is_error
    }
}
