//! Console output formatter for assistant replies

use colored::Colorize;
use toolgate_application::{UiMessage, UiMessageKind};

/// Formats replies and notices for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format any UI message according to its kind
    pub fn format(message: &UiMessage) -> String {
        match message.kind {
            UiMessageKind::Answer => Self::format_answer(&message.content),
            UiMessageKind::Thinking => Self::format_thinking(&message.content),
            UiMessageKind::ApprovalRequest => Self::format_approval(&message.content),
            UiMessageKind::Notice => Self::format_notice(&message.content),
            UiMessageKind::Error => Self::format_error(&message.content),
        }
    }

    /// The final answer, printed as-is after a blank line
    pub fn format_answer(text: &str) -> String {
        format!("\n{}\n", text.trim_end())
    }

    /// Internal reasoning, dimmed and indented under a header
    pub fn format_thinking(text: &str) -> String {
        let mut output = Self::section_header("Thinking");
        output.push_str(&Self::indent(text.trim(), "  │ ").dimmed().to_string());
        output.push('\n');
        output
    }

    pub fn format_approval(prompt: &str) -> String {
        format!(
            "\n{} {}\n",
            "Approval needed:".yellow().bold(),
            prompt.yellow()
        )
    }

    pub fn format_notice(text: &str) -> String {
        format!("\n{} {}\n", "--".cyan(), text)
    }

    pub fn format_error(text: &str) -> String {
        format!("\n{} {}\n", "Error:".red().bold(), text.red())
    }

    /// Header shown when the REPL starts
    pub fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("── {} ──", title).dimmed().bold())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_answer_is_unchanged_text() {
        plain();
        assert_eq!(ConsoleFormatter::format_answer("42\n\n"), "\n42\n");
    }

    #[test]
    fn test_thinking_is_indented_under_header() {
        plain();
        let output = ConsoleFormatter::format_thinking("step one\nstep two");
        assert!(output.contains("Thinking"));
        assert!(output.contains("  │ step one\n  │ step two"));
    }

    #[test]
    fn test_format_dispatches_on_kind() {
        plain();
        let approval = ConsoleFormatter::format(&UiMessage::new(
            UiMessageKind::ApprovalRequest,
            "Run write_file? (yes/no)",
        ));
        assert!(approval.contains("Approval needed: Run write_file?"));

        let error = ConsoleFormatter::format(&UiMessage::error("backend down"));
        assert!(error.contains("Error: backend down"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
