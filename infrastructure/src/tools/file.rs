//! File operation tools: read_file, write_file

use super::workspace::Workspace;
use std::fs;
use std::time::Instant;
use toolgate_domain::tool::{
    entities::{RiskTier, ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};

/// Tool name constants
pub const READ_FILE: &str = "read_file";
pub const WRITE_FILE: &str = "write_file";

/// Maximum file size to read (10 MB)
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Get the tool definition for read_file
pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        READ_FILE,
        "Read the contents of a text file",
        RiskTier::Safe,
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to read", true).with_type("path"))
    .with_parameter(
        ToolParameter::new("offset", "Line number to start reading from (0-indexed)", false)
            .with_type("number"),
    )
    .with_parameter(
        ToolParameter::new("limit", "Maximum number of lines to read", false).with_type("number"),
    )
}

/// Get the tool definition for write_file
pub fn write_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        WRITE_FILE,
        "Write content to a file. Creates the file if it doesn't exist, or overwrites it.",
        RiskTier::NeedsApproval,
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to write", true).with_type("path"))
    .with_parameter(
        ToolParameter::new("content", "Content to write to the file", true).with_type("string"),
    )
    .with_parameter(
        ToolParameter::new("create_dirs", "Create parent directories if they don't exist", false)
            .with_type("boolean"),
    )
}

/// Execute the read_file tool
pub fn execute_read_file(workspace: &Workspace, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(READ_FILE, ToolError::invalid_argument(e)),
    };
    let path = match workspace.resolve(path_str) {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(READ_FILE, e),
    };

    if !path.exists() {
        return ToolResult::failure(READ_FILE, ToolError::not_found(path_str));
    }
    if !path.is_file() {
        return ToolResult::failure(
            READ_FILE,
            ToolError::invalid_argument(format!("'{}' is not a file", path_str)),
        );
    }

    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        Err(e) => {
            return ToolResult::failure(
                READ_FILE,
                ToolError::execution_failed(format!("Failed to get file metadata: {}", e)),
            );
        }
    };
    if metadata.len() > MAX_READ_SIZE {
        return ToolResult::failure(
            READ_FILE,
            ToolError::invalid_argument(format!(
                "File too large ({} bytes). Maximum size is {} bytes",
                metadata.len(),
                MAX_READ_SIZE
            )),
        );
    }

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return ToolResult::failure(READ_FILE, ToolError::permission_denied(path_str));
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return ToolResult::failure(
                READ_FILE,
                ToolError::invalid_argument(format!("'{}' is not a UTF-8 text file", path_str)),
            );
        }
        Err(e) => {
            return ToolResult::failure(
                READ_FILE,
                ToolError::execution_failed(format!("Failed to read file: {}", e)),
            );
        }
    };

    let offset = call.get_i64("offset").unwrap_or(0).max(0) as usize;
    let limit = call.get_i64("limit").map(|l| l.max(0) as usize);

    let output = if offset > 0 || limit.is_some() {
        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        if offset >= total_lines {
            String::new()
        } else {
            let end = match limit {
                Some(l) => (offset + l).min(total_lines),
                None => total_lines,
            };
            lines[offset..end].join("\n")
        }
    } else {
        content
    };
    let output = if output.is_empty() {
        "(empty file)".to_string()
    } else {
        output
    };

    ToolResult::success(READ_FILE, output.clone()).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        bytes: Some(output.len()),
        path: Some(workspace.display_path(&path)),
        ..Default::default()
    })
}

/// Execute the write_file tool
pub fn execute_write_file(workspace: &Workspace, call: &ToolCall) -> ToolResult {
    let start = Instant::now();

    let path_str = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(WRITE_FILE, ToolError::invalid_argument(e)),
    };
    let content = match call.require_string("content") {
        Ok(c) => c,
        Err(e) => return ToolResult::failure(WRITE_FILE, ToolError::invalid_argument(e)),
    };
    let path = match workspace.resolve(path_str) {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(WRITE_FILE, e),
    };

    if path.is_dir() {
        return ToolResult::failure(
            WRITE_FILE,
            ToolError::invalid_argument(format!("'{}' is a directory", path_str)),
        );
    }

    let create_dirs = call.get_bool("create_dirs").unwrap_or(false);
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        if !create_dirs {
            return ToolResult::failure(
                WRITE_FILE,
                ToolError::not_found(format!(
                    "Parent directory does not exist: {}",
                    workspace.display_path(parent)
                )),
            );
        }
        if let Err(e) = fs::create_dir_all(parent) {
            return ToolResult::failure(
                WRITE_FILE,
                ToolError::execution_failed(format!("Failed to create parent directories: {}", e)),
            );
        }
    }

    if let Some(parent) = path.parent()
        && let Err(e) = workspace.confirm(parent, path_str)
    {
        return ToolResult::failure(WRITE_FILE, e);
    }

    let bytes = content.len();
    if let Err(e) = fs::write(&path, content) {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            return ToolResult::failure(WRITE_FILE, ToolError::permission_denied(path_str));
        }
        return ToolResult::failure(
            WRITE_FILE,
            ToolError::execution_failed(format!("Failed to write file: {}", e)),
        );
    }

    let display = workspace.display_path(&path);
    ToolResult::success(WRITE_FILE, format!("Successfully wrote {} bytes to {}", bytes, display))
        .with_metadata(ToolResultMetadata {
            duration_ms: Some(start.elapsed().as_millis() as u64),
            bytes: Some(bytes),
            path: Some(display),
            ..Default::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        (dir, workspace)
    }

    #[test]
    fn test_read_file_success() {
        let (dir, ws) = workspace();
        fs::write(dir.path().join("hello.txt"), "Hello, World!\n").unwrap();

        let call = ToolCall::new(READ_FILE).with_arg("path", "hello.txt");
        let result = execute_read_file(&ws, &call);

        assert!(result.is_success());
        assert!(result.text.contains("Hello, World!"));
        assert_eq!(result.metadata.path.as_deref(), Some("hello.txt"));
    }

    #[test]
    fn test_read_file_not_found() {
        let (_dir, ws) = workspace();
        let result = execute_read_file(&ws, &ToolCall::new(READ_FILE).with_arg("path", "nope.txt"));

        assert!(result.is_error);
        assert_eq!(result.error_code.as_deref(), Some("NOT_FOUND"));
        assert_eq!(result.text, "Error: Not found: nope.txt");
    }

    #[test]
    fn test_read_file_outside_workspace() {
        let (_dir, ws) = workspace();
        let result =
            execute_read_file(&ws, &ToolCall::new(READ_FILE).with_arg("path", "../../etc/passwd"));

        assert_eq!(result.error_code.as_deref(), Some("PERMISSION_DENIED"));
        assert!(result.text.to_lowercase().contains("permission denied"));
    }

    #[test]
    fn test_read_file_with_offset_and_limit() {
        let (dir, ws) = workspace();
        fs::write(dir.path().join("lines.txt"), "line1\nline2\nline3\nline4\nline5\n").unwrap();

        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "lines.txt")
            .with_arg("offset", 1)
            .with_arg("limit", 2);
        let result = execute_read_file(&ws, &call);

        assert_eq!(result.text, "line2\nline3");
    }

    #[test]
    fn test_read_directory_is_invalid() {
        let (_dir, ws) = workspace();
        let result = execute_read_file(&ws, &ToolCall::new(READ_FILE).with_arg("path", "."));
        assert_eq!(result.error_code.as_deref(), Some("INVALID_ARGUMENT"));
    }

    #[test]
    fn test_write_file_success() {
        let (dir, ws) = workspace();

        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "out.txt")
            .with_arg("content", "Hello!");
        let result = execute_write_file(&ws, &call);

        assert!(result.is_success());
        assert_eq!(result.text, "Successfully wrote 6 bytes to out.txt");
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "Hello!");
    }

    #[test]
    fn test_write_file_create_dirs() {
        let (dir, ws) = workspace();

        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "sub/dir/test.txt")
            .with_arg("content", "content")
            .with_arg("create_dirs", true);
        let result = execute_write_file(&ws, &call);

        assert!(result.is_success());
        assert!(dir.path().join("sub/dir/test.txt").exists());
    }

    #[test]
    fn test_write_file_parent_not_exists() {
        let (_dir, ws) = workspace();

        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "missing/file.txt")
            .with_arg("content", "content");
        let result = execute_write_file(&ws, &call);

        assert_eq!(result.error_code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_write_file_outside_workspace() {
        let (_dir, ws) = workspace();

        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "/tmp/../escape.txt")
            .with_arg("content", "x");
        let result = execute_write_file(&ws, &call);

        assert_eq!(result.error_code.as_deref(), Some("PERMISSION_DENIED"));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_file_through_symlinked_dir_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        let (dir, ws) = workspace();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let call = ToolCall::new(WRITE_FILE)
            .with_arg("path", "link/newdir/pwned.txt")
            .with_arg("content", "x")
            .with_arg("create_dirs", true);
        let result = execute_write_file(&ws, &call);

        assert!(result.is_error);
        assert_eq!(result.error_code.as_deref(), Some("PERMISSION_DENIED"));
        assert!(!outside.path().join("newdir").exists());
        assert!(!outside.path().join("newdir/pwned.txt").exists());
    }
}
