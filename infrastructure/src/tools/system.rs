//! System information tool: system_info

use std::time::Instant;
use toolgate_domain::tool::{
    entities::{RiskTier, ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};

/// Tool name constant
pub const SYSTEM_INFO: &str = "system_info";

/// Environment variables reported by `info_type = "environment"`
const REPORTED_ENV_VARS: &[&str] = &["SHELL", "TERM", "LANG", "HOME", "USER", "PATH"];

/// Get the tool definition for system_info
pub fn system_info_definition() -> ToolDefinition {
    ToolDefinition::new(
        SYSTEM_INFO,
        "Report information about the host system",
        RiskTier::Safe,
    )
    .with_parameter(
        ToolParameter::new(
            "info_type",
            "One of: all, os, hardware, environment (default: all)",
            false,
        )
        .with_type("string"),
    )
}

/// Execute the system_info tool
pub fn execute_system_info(call: &ToolCall) -> ToolResult {
    let start = Instant::now();
    let info_type = call
        .get_string("info_type")
        .unwrap_or("all")
        .trim()
        .to_lowercase();

    let sections = match info_type.as_str() {
        "all" => vec![os_section(), hardware_section(), environment_section()],
        "os" => vec![os_section()],
        "hardware" => vec![hardware_section()],
        "environment" | "env" => vec![environment_section()],
        other => {
            return ToolResult::failure(
                SYSTEM_INFO,
                ToolError::invalid_argument(format!(
                    "Unknown info_type '{}'. Expected one of: all, os, hardware, environment",
                    other
                )),
            );
        }
    };

    let output = sections.join("\n\n");
    ToolResult::success(SYSTEM_INFO, output.clone()).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        bytes: Some(output.len()),
        ..Default::default()
    })
}

fn os_section() -> String {
    let mut lines = vec![
        "OS:".to_string(),
        format!("  family: {}", std::env::consts::FAMILY),
        format!("  os: {}", std::env::consts::OS),
    ];
    if let Some(release) = os_release() {
        lines.push(format!("  release: {}", release));
    }
    lines.join("\n")
}

fn hardware_section() -> String {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    [
        "Hardware:".to_string(),
        format!("  arch: {}", std::env::consts::ARCH),
        format!("  cpus: {}", cpus),
    ]
    .join("\n")
}

fn environment_section() -> String {
    let mut lines = vec!["Environment:".to_string()];
    if let Ok(cwd) = std::env::current_dir() {
        lines.push(format!("  cwd: {}", cwd.display()));
    }
    for var in REPORTED_ENV_VARS {
        if let Ok(value) = std::env::var(var) {
            lines.push(format!("  {}: {}", var, value));
        }
    }
    lines.join("\n")
}

#[cfg(target_os = "linux")]
fn os_release() -> Option<String> {
    let content = std::fs::read_to_string("/etc/os-release").ok()?;
    content
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|name| name.trim_matches('"').to_string())
}

#[cfg(not(target_os = "linux"))]
fn os_release() -> Option<String> {
    None
}
