//! CLI entrypoint for toolgate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolgate_application::{
    AutoApproveChatUi, BackendCell, ChatUiPort, ConversationLogger, GatewayError,
    HandleMessageUseCase, LlmGateway, NoConversationLogger, NoReasoningProgress,
    PreloadedGateway, ReasoningLoopUseCase, ReasoningProgressNotifier, TurnReplyKind,
    gateway_factory,
};
use toolgate_domain::PermissionGuard;
use toolgate_infrastructure::{
    BuiltinProvider, ConfigLoader, FileConfig, FileLoggingConfig, JsonRpcToolProvider,
    JsonlConversationLogger, OllamaGateway, ToolRegistry,
};
use toolgate_presentation::{ChatRepl, Cli, ConsoleChatUi, ProgressReporter, ReplConfig};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        let config = load_config(&cli)?;
        println!();
        println!("Effective configuration:");
        println!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to render configuration")?
        );
        return Ok(());
    }

    let mut config = load_config(&cli)?;
    apply_cli_overrides(&mut config, &cli);

    let _log_guard = init_tracing(cli.verbose, &config.logging);
    info!("Starting toolgate");

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("Config error: {}", error);
        }
        bail!("Invalid configuration ({} problem(s))", errors.len());
    }

    let session_id = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let logger = conversation_logger(&config.logging, &session_id);

    // === Dependency Injection ===
    let gateway = build_gateway(&config);
    let tools = build_tools(&config).await;

    let mut reasoning = ReasoningLoopUseCase::new(gateway, tools)
        .with_params(config.reasoning_params())
        .with_template(config.persona.template())
        .with_options(config.model.generation_options())
        .with_logger(logger.clone());

    let guard = PermissionGuard::new().with_denied(config.tools.denied.clone());
    let repl_config = repl_config(&config, cli.quiet);
    let console: Arc<dyn ChatUiPort> = Arc::new(
        ConsoleChatUi::new()
            .with_thinking(repl_config.show_thinking)
            .with_stream(repl_config.show_stream),
    );

    // Chat mode
    if cli.chat {
        let use_case = HandleMessageUseCase::new(reasoning, console).with_logger(logger);
        let session = use_case.new_session(session_id, guard);
        let mut repl = ChatRepl::new(use_case, session).with_config(repl_config);
        repl.run().await?;
        return Ok(());
    }

    // Single query mode - query is required
    let query = match cli.query {
        Some(q) => q,
        None => bail!("A query is required. Use --chat for interactive mode."),
    };

    let cancel = CancellationToken::new();
    reasoning = reasoning.with_cancellation(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let ui: Arc<dyn ChatUiPort> = if cli.yes {
        Arc::new(AutoApproveChatUi::new(console))
    } else {
        console
    };
    let use_case = HandleMessageUseCase::new(reasoning, ui).with_logger(logger);
    let mut session = use_case.new_session(session_id, guard);

    let progress: Box<dyn ReasoningProgressNotifier> = if repl_config.show_progress {
        Box::new(ProgressReporter::new().with_streaming(repl_config.show_stream))
    } else {
        Box::new(NoReasoningProgress)
    };

    let reply = use_case
        .execute_to_completion(
            &mut session,
            &query,
            config.agent.approval_timeout(),
            progress.as_ref(),
        )
        .await;

    if reply.kind == TurnReplyKind::Error {
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.model.base_url = base_url.clone();
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.agent.max_iterations = max_iterations;
    }
    if let Some(workspace) = &cli.workspace {
        config.tools.workspace_root = workspace.display().to_string();
    }
}

/// Install the stderr subscriber, plus a daily rolling file when configured.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing(verbose: u8, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = if logging.file {
        let appender = tracing_appender::rolling::daily(log_dir(logging), "toolgate.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn log_dir(logging: &FileLoggingConfig) -> PathBuf {
    logging
        .dir
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| ConfigLoader::data_dir().join("logs"))
}

fn conversation_logger(logging: &FileLoggingConfig, session_id: &str) -> Arc<dyn ConversationLogger> {
    if !logging.conversation_log {
        return Arc::new(NoConversationLogger);
    }
    match JsonlConversationLogger::for_session(log_dir(logging), session_id) {
        Some(logger) => {
            info!(path = %logger.path().display(), "Conversation log enabled");
            Arc::new(logger)
        }
        None => {
            warn!("Conversation log unavailable, continuing without it");
            Arc::new(NoConversationLogger)
        }
    }
}

/// Shared Ollama backend, created on first use and warmed in the background
fn build_gateway(config: &FileConfig) -> Arc<dyn LlmGateway> {
    let base_url = config.model.base_url.clone();
    let model = config.model.name.clone();
    let preload = config.model.preload;

    let factory = {
        let model = model.clone();
        gateway_factory(move || {
            let base_url = base_url.clone();
            let model = model.clone();
            async move {
                let gateway = OllamaGateway::new(&base_url, model).map_err(GatewayError::from)?;
                if preload {
                    gateway.warm_up().await?;
                }
                Ok::<_, GatewayError>(Arc::new(gateway) as Arc<dyn LlmGateway>)
            }
        })
    };

    let gateway: Arc<dyn LlmGateway> = Arc::new(PreloadedGateway::new(
        Arc::new(BackendCell::new()),
        model,
        factory,
    ));

    if preload {
        let warming = gateway.clone();
        tokio::spawn(async move {
            if let Err(e) = warming.warm_up().await {
                warn!(error = %e, "Model preload failed; will retry on first request");
            }
        });
    }
    gateway
}

async fn build_tools(config: &FileConfig) -> Arc<ToolRegistry> {
    let tools = &config.tools;
    let mut registry = ToolRegistry::new()
        .with_tier_overrides(tools.auto_approve.clone(), tools.approval_required.clone());

    if let Some(provider_config) = tools.jsonrpc_provider_config() {
        registry = registry.register(JsonRpcToolProvider::new(provider_config));
    }
    if tools.builtin {
        registry = registry.register(
            BuiltinProvider::new(tools.workspace_root()).with_command_timeout(tools.command_timeout()),
        );
    }

    registry.discover().await;
    let stats = registry.stats();
    info!(
        providers = stats.total_providers,
        tools = stats.total_tools,
        "Tool registry ready"
    );
    Arc::new(registry)
}

fn repl_config(config: &FileConfig, quiet: bool) -> ReplConfig {
    ReplConfig {
        show_progress: config.repl.show_progress && !quiet,
        show_thinking: config.repl.show_thinking,
        show_stream: config.repl.show_stream,
        history_file: config.repl.history_file.as_deref().map(expand_home),
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
