//! Terminal output.
//!
//! Convoy is non-interactive; the reporter only writes status lines.
//! Step results go to stdout, errors to stderr, both honoring quiet and
//! verbose modes and NO_COLOR.

use console::style;

use crate::sequencer::{RunOutcome, RunReport};
use crate::steps::{ExecutionResult, ExecutionStatus};

/// Output verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Errors and the final outcome only.
    Quiet,
    /// Step lines and outcome.
    #[default]
    Normal,
    /// Step lines with durations and addresses.
    Verbose,
}

/// Writes run progress and outcomes to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    mode: OutputMode,
}

impl Reporter {
    /// Create a reporter.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print an informational line (suppressed in quiet mode).
    pub fn status(&self, message: &str) {
        if self.mode != OutputMode::Quiet {
            println!("{}", message);
        }
    }

    /// Print a detail line (verbose mode only).
    pub fn verbose(&self, message: &str) {
        if self.mode == OutputMode::Verbose {
            println!("{}", style(message).dim());
        }
    }

    /// Print an error line to stderr (never suppressed).
    pub fn error(&self, message: &str) {
        eprintln!("{}", style(message).red());
    }

    /// Print a step-starting line.
    pub fn step_starting(&self, index: u32, label: &str, position: usize, total: usize) {
        if self.mode != OutputMode::Quiet {
            println!(
                "{} step {} '{}' ({}/{})",
                style("◉").cyan(),
                index,
                label,
                position + 1,
                total
            );
        }
    }

    /// Print a step result line.
    pub fn step_finished(&self, result: &ExecutionResult) {
        match &result.status {
            ExecutionStatus::Applied(handle) => {
                if self.mode != OutputMode::Quiet {
                    println!(
                        "{} step {} '{}' applied ({})",
                        style("✓").green(),
                        result.step_index,
                        result.label,
                        handle.address_or_id
                    );
                }
                self.verbose(&format!("  took {:.1?}", result.duration));
            }
            ExecutionStatus::AlreadyApplied(handle) => {
                if self.mode != OutputMode::Quiet {
                    println!(
                        "{} step {} '{}' already applied ({})",
                        style("⊘").yellow(),
                        result.step_index,
                        result.label,
                        handle.address_or_id
                    );
                }
            }
            ExecutionStatus::Failed => {
                // The halt summary carries the cause; nothing extra here.
            }
        }
    }

    /// Print the run summary and return the process exit code.
    pub fn run_summary(&self, report: &RunReport) -> i32 {
        match &report.outcome {
            RunOutcome::Completed => {
                self.status(&format!(
                    "Completed: {} applied, {} already applied on '{}'",
                    report.applied.len(),
                    report.already_applied.len(),
                    report.target
                ));
                0
            }
            RunOutcome::Halted {
                step_index,
                label,
                error,
            } => {
                self.error(&format!(
                    "Halted at step {} '{}' on '{}': {}",
                    step_index, label, report.target, error
                ));
                1
            }
            RunOutcome::Cancelled { step_index, label } => {
                self.error(&format!(
                    "Cancelled before step {} '{}' on '{}'",
                    step_index, label, report.target
                ));
                1
            }
        }
    }
}
