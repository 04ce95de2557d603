//! Directory listing tool: list_directory

use super::workspace::Workspace;
use std::fs;
use std::time::Instant;
use toolgate_domain::tool::{
    entities::{RiskTier, ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};

/// Tool name constant
pub const LIST_DIRECTORY: &str = "list_directory";

/// Entries beyond this are summarized
const MAX_ENTRIES: usize = 500;

/// Get the tool definition for list_directory
pub fn list_directory_definition() -> ToolDefinition {
    ToolDefinition::new(
        LIST_DIRECTORY,
        "List the entries of a directory (directories end with '/')",
        RiskTier::Safe,
    )
    .with_parameter(
        ToolParameter::new("path", "Directory to list (default: workspace root)", false)
            .with_type("path"),
    )
}

/// Execute the list_directory tool
pub fn execute_list_directory(workspace: &Workspace, call: &ToolCall) -> ToolResult {
    let start = Instant::now();
    let path_str = call.get_string("path").unwrap_or(".");

    let path = match workspace.resolve(path_str) {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(LIST_DIRECTORY, e),
    };
    if !path.exists() {
        return ToolResult::failure(LIST_DIRECTORY, ToolError::not_found(path_str));
    }
    if !path.is_dir() {
        return ToolResult::failure(
            LIST_DIRECTORY,
            ToolError::invalid_argument(format!("'{}' is not a directory", path_str)),
        );
    }

    let read_dir = match fs::read_dir(&path) {
        Ok(r) => r,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return ToolResult::failure(LIST_DIRECTORY, ToolError::permission_denied(path_str));
        }
        Err(e) => {
            return ToolResult::failure(
                LIST_DIRECTORY,
                ToolError::execution_failed(format!("Failed to read directory: {}", e)),
            );
        }
    };

    let mut entries: Vec<String> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir { format!("{}/", name) } else { name }
        })
        .collect();
    entries.sort();

    let total = entries.len();
    let output = if entries.is_empty() {
        "(empty directory)".to_string()
    } else if total > MAX_ENTRIES {
        entries.truncate(MAX_ENTRIES);
        format!("{}\n... ({} more entries)", entries.join("\n"), total - MAX_ENTRIES)
    } else {
        entries.join("\n")
    };

    ToolResult::success(LIST_DIRECTORY, output).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        path: Some(workspace.display_path(&path)),
        ..Default::default()
    })
}
