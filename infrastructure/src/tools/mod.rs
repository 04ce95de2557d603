//! Tool implementations and providers
//!
//! ## Providers
//!
//! - `builtin`: local tools confined to a workspace root, always available
//! - `jsonrpc`: tools served by a line-based JSON-RPC subprocess
//!
//! Both are merged by the [`ToolRegistry`], which is what the reasoning
//! loop talks to.

pub mod builtin;
pub mod command;
pub mod directory;
pub mod file;
pub mod system;
pub mod workspace;

mod registry;

pub use builtin::BuiltinProvider;
pub use registry::{RegistryStats, ToolRegistry};
pub use workspace::Workspace;

use toolgate_domain::tool::entities::ToolSpec;

/// Create the default tool specification with all builtin tools
pub fn default_tool_spec() -> ToolSpec {
    read_only_tool_spec()
        .register(file::write_file_definition())
        .register(command::execute_command_definition())
}

/// Get definitions for the safe (read-only) tools only
pub fn read_only_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(file::read_file_definition())
        .register(directory::list_directory_definition())
        .register(system::system_info_definition())
}
