//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::{ConsoleFormatter, ProgressReporter, ReplConfig};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::io;
use toolgate_application::{ChatSession, HandleMessageUseCase, NoReasoningProgress};

const HISTORY_SIZE: usize = 1000;

/// What the REPL should do after a slash command
#[derive(Debug, PartialEq, Eq)]
enum CommandOutcome {
    Continue,
    Quit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: HandleMessageUseCase,
    session: ChatSession,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl for one conversation session
    pub fn new(use_case: HandleMessageUseCase, session: ChatSession) -> Self {
        Self {
            use_case,
            session,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL until /quit or Ctrl+D
    pub async fn run(&mut self) -> io::Result<()> {
        let mut editor = Reedline::create();
        if let Some(path) = self.config.history_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_SIZE, path) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => tracing::warn!(error = %e, "History file unavailable"),
            }
        }

        self.print_welcome();

        loop {
            let prompt = self.prompt();
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) == CommandOutcome::Quit {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn prompt(&self) -> DefaultPrompt {
        let left = if self.session.has_pending_approval() {
            "approve? (yes/no)"
        } else {
            "toolgate"
        };
        DefaultPrompt::new(
            DefaultPromptSegment::Basic(left.to_string()),
            DefaultPromptSegment::Empty,
        )
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", ConsoleFormatter::header("Toolgate - Chat Mode"));
        println!();
        println!(
            "Model: {}",
            self.use_case.reasoning().model_name().cyan()
        );
        println!();
        Self::print_commands();
    }

    fn print_commands() {
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /tools           - List available tools");
        println!("  /clear           - Forget the conversation");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }

    /// Handle slash commands
    fn handle_command(&mut self, cmd: &str) -> CommandOutcome {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                CommandOutcome::Quit
            }
            "/help" | "/h" | "/?" => {
                println!();
                Self::print_commands();
                CommandOutcome::Continue
            }
            "/tools" => {
                println!();
                println!("{}", self.tools_listing());
                CommandOutcome::Continue
            }
            "/clear" => {
                self.session.reset();
                println!("Conversation cleared.");
                CommandOutcome::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandOutcome::Continue
            }
        }
    }

    fn tools_listing(&self) -> String {
        let spec = self.use_case.reasoning().tools().tool_spec();
        let mut lines = vec!["Available tools:".bold().to_string()];
        for tool in spec.sorted() {
            let tier = if tool.risk_tier.requires_approval() {
                "asks first".yellow()
            } else {
                "safe".green()
            };
            lines.push(format!("  {:<16} [{}] {}", tool.name, tier, tool.description));
        }
        lines.join("\n")
    }

    async fn process_message(&mut self, message: &str) {
        if self.config.show_progress {
            let progress = ProgressReporter::new().with_streaming(self.config.show_stream);
            self.use_case
                .execute(&mut self.session, message, &progress)
                .await;
        } else {
            self.use_case
                .execute(&mut self.session, message, &NoReasoningProgress)
                .await;
        }
        println!();
    }
}
