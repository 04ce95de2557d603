//! Command execution tool: execute_command

use super::workspace::Workspace;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use toolgate_domain::tool::{
    entities::{RiskTier, ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use tracing::debug;

/// Tool name constant
pub const EXECUTE_COMMAND: &str = "execute_command";

/// Default timeout for command execution (30 seconds)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum output size (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Get the tool definition for execute_command
pub fn execute_command_definition() -> ToolDefinition {
    ToolDefinition::new(
        EXECUTE_COMMAND,
        "Execute a shell command and return its output",
        RiskTier::NeedsApproval,
    )
    .with_parameter(
        ToolParameter::new("command", "The command to execute", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("working_directory", "Working directory for the command", false)
            .with_type("path"),
    )
    .with_parameter(
        ToolParameter::new("timeout", "Timeout in seconds", false).with_type("number"),
    )
}

/// Execute the execute_command tool
///
/// A non-zero exit status is still a successful tool run; the exit code is
/// reported in the text so the model can react to it.
pub async fn execute_command(
    workspace: &Workspace,
    call: &ToolCall,
    default_timeout: Duration,
) -> ToolResult {
    let start = Instant::now();

    let command_str = match call.require_string("command") {
        Ok(c) => c,
        Err(e) => return ToolResult::failure(EXECUTE_COMMAND, ToolError::invalid_argument(e)),
    };

    let working_dir = match workspace.resolve(call.get_string("working_directory").unwrap_or("."))
    {
        Ok(dir) => dir,
        Err(e) => return ToolResult::failure(EXECUTE_COMMAND, e),
    };
    if !working_dir.is_dir() {
        return ToolResult::failure(
            EXECUTE_COMMAND,
            ToolError::not_found(format!(
                "Working directory does not exist: {}",
                workspace.display_path(&working_dir)
            )),
        );
    }

    let timeout = match call.get_i64("timeout") {
        Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
        _ => default_timeout,
    };

    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", command_str]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", command_str]);
        c
    };
    cmd.current_dir(&working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(command = command_str, timeout_secs = timeout.as_secs(), "Running command");

    let child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            return ToolResult::failure(
                EXECUTE_COMMAND,
                ToolError::execution_failed(format!("Failed to spawn command: {}", e)),
            );
        }
    };

    // dropping the future on timeout kills the child
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult::failure(
                EXECUTE_COMMAND,
                ToolError::execution_failed(format!("Failed to wait for command: {}", e)),
            );
        }
        Err(_) => {
            return ToolResult::failure(
                EXECUTE_COMMAND,
                ToolError::timeout(format!(
                    "command did not finish within {} seconds: {}",
                    timeout.as_secs(),
                    command_str
                )),
            );
        }
    };

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut combined_output = String::new();
    if !stdout.is_empty() {
        combined_output.push_str(&stdout);
    }
    if !stderr.is_empty() {
        if !combined_output.is_empty() {
            combined_output.push_str("\n--- stderr ---\n");
        }
        combined_output.push_str(&stderr);
    }
    if combined_output.len() > MAX_OUTPUT_SIZE {
        let mut cut = MAX_OUTPUT_SIZE;
        while !combined_output.is_char_boundary(cut) {
            cut -= 1;
        }
        combined_output.truncate(cut);
        combined_output.push_str("\n... (output truncated)");
    }

    let text = if output.status.success() {
        if combined_output.is_empty() {
            "(no output)".to_string()
        } else {
            combined_output
        }
    } else if combined_output.is_empty() {
        format!("Command exited with code {}", exit_code)
    } else {
        format!("Command exited with code {}\n{}", exit_code, combined_output)
    };

    let bytes = text.len();
    ToolResult::success(EXECUTE_COMMAND, text).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        bytes: Some(bytes),
        path: Some(workspace.display_path(&working_dir)),
        exit_code: Some(exit_code),
    })
}
