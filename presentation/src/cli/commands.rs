//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for toolgate
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(author, version, about = "Local ReAct assistant with approval-gated tools")]
#[command(long_about = r#"
Toolgate answers questions with a local model served by Ollama. Complex
requests run through a reasoning loop that can call tools: reading files,
listing directories, inspecting the system and (with your approval) writing
files or running commands.

Tools that change something always ask before they run. Answer "yes" or
"no" when prompted; anything else keeps the request pending.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./toolgate.toml     Project-level config
3. ~/.config/toolgate/config.toml   Global config
Environment variables prefixed with TOOLGATE_ override all of them
(e.g. TOOLGATE_MODEL__NAME=llama3.1:8b).

Example:
  toolgate "What is in this directory?"
  toolgate --yes "Create notes.txt containing 'hello'"
  toolgate --chat -m qwen3:14b
"#)]
pub struct Cli {
    /// The query to answer (not required in chat mode)
    pub query: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Model to use (overrides config)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Ollama server URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Maximum reasoning cycles per query
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Directory the builtin tools are confined to
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Approve every tool call without asking (single-shot mode only)
    #[arg(short, long)]
    pub yes: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
