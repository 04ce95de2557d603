//! Progress reporting for the reasoning loop

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use toolgate_application::ReasoningProgressNotifier;
use toolgate_domain::{ApprovalRequest, LoopPhase, TaskComplexity};

/// Reports progress with a spinner per reasoning cycle
pub struct ProgressReporter {
    multi: MultiProgress,
    cycle_bar: Mutex<Option<ProgressBar>>,
    /// Clear the spinner while the model streams tokens to the terminal
    streaming: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            cycle_bar: Mutex::new(None),
            streaming: false,
        }
    }

    /// Hide the spinner during model output that is echoed live
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    fn cycle_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub(crate) fn phase_name(phase: LoopPhase) -> &'static str {
        match phase {
            LoopPhase::Classify => "Classifying",
            LoopPhase::SimpleResponse => "Answering",
            LoopPhase::QueryModel => "Thinking",
            LoopPhase::Parse => "Reading response",
            LoopPhase::PermissionCheck => "Checking permissions",
            LoopPhase::Execute => "Running tool",
            LoopPhase::ContinueReasoning => "Continuing",
            LoopPhase::FinalAnswer => "Done",
            LoopPhase::AwaitingApproval => "Waiting for approval",
            LoopPhase::MaxIterationsReached => "Cycle limit reached",
        }
    }

    fn start_bar(&self, prefix: String) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::cycle_style());
        pb.set_prefix(prefix);
        pb.set_message("...");
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.cycle_bar.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn set_message(&self, message: impl Into<String>) {
        if let Ok(slot) = self.cycle_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(message.into());
        }
    }

    /// Print a line above the spinner without tearing it
    fn println(&self, line: String) {
        if self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.cycle_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningProgressNotifier for ProgressReporter {
    fn on_classified(&self, complexity: TaskComplexity) {
        if complexity.is_complex() {
            self.start_bar("Reasoning".to_string());
        } else {
            self.start_bar("Answering".to_string());
        }
    }

    fn on_phase_change(&self, phase: LoopPhase) {
        self.set_message(Self::phase_name(phase));
    }

    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        self.start_bar(format!("Reasoning cycle {}/{}", iteration, max_iterations));
    }

    fn on_tool_call(&self, tool_name: &str, args_preview: &str) {
        self.set_message(format!("Running: {}", tool_name));
        self.println(format!(
            "  {} {} {}",
            "→".blue(),
            tool_name.cyan(),
            truncate(args_preview, 60).dimmed()
        ));
    }

    fn on_tool_result(&self, tool_name: &str, success: bool, duration_ms: Option<u64>) {
        let timing = duration_ms
            .map(|ms| format!("({}ms)", ms))
            .unwrap_or_default();
        if success {
            self.println(format!(
                "  {} {} {}",
                "✓".green(),
                tool_name.green(),
                timing.dimmed()
            ));
        } else {
            self.println(format!("  {} {} {}", "✗".red(), tool_name.red(), timing.dimmed()));
        }
    }

    fn on_approval_requested(&self, _request: &ApprovalRequest) {
        self.clear();
    }

    fn on_llm_stream_start(&self) {
        if self.streaming {
            self.clear();
        } else {
            self.set_message("Waiting for the model...");
        }
    }

    fn on_finished(&self) {
        self.clear();
    }
}

/// Simple text-based progress (no spinner)
pub struct SimpleProgress;

impl ReasoningProgressNotifier for SimpleProgress {
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        println!(
            "{} {}",
            "->".cyan(),
            format!("Reasoning cycle {}/{}", iteration, max_iterations).bold()
        );
    }

    fn on_tool_call(&self, tool_name: &str, args_preview: &str) {
        println!("  {} {}", tool_name.cyan(), truncate(args_preview, 60).dimmed());
    }

    fn on_tool_result(&self, tool_name: &str, success: bool, _duration_ms: Option<u64>) {
        if success {
            println!("  {} {}", "v".green(), tool_name);
        } else {
            println!("  {} {} (failed)", "x".red(), tool_name);
        }
    }

    fn on_phase_change(&self, phase: LoopPhase) {
        if phase == LoopPhase::MaxIterationsReached {
            println!("  {}", ProgressReporter::phase_name(phase).yellow());
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
