//! Run reports.
//!
//! A run ends in exactly one of two step-level outcomes: every step applied
//! (or already applied) and the run is Completed, or one step failed and
//! the run is Halted at a precise stopping point. There is no ambiguous
//! partial-success state. Cancellation is the one user-initiated exception
//! and names the step the run stopped in front of.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::steps::ExecutionResult;

/// Terminal outcome of a sequencer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All pending steps applied or already applied.
    Completed,

    /// Stopped at a failing step; nothing after it was attempted.
    Halted {
        step_index: u32,
        label: String,
        error: String,
    },

    /// Cancelled by the user between steps, before the named step started.
    Cancelled { step_index: u32, label: String },
}

/// Report of a single sequencer run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Target the run applied to.
    pub target: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Completion index recorded before the run began (-1 for fresh).
    pub resumed_from: i64,

    /// Steps performed this run, in order.
    pub applied: Vec<ExecutionResult>,

    /// Steps found already applied on the target this run, in order.
    pub already_applied: Vec<ExecutionResult>,

    /// Terminal outcome.
    pub outcome: RunOutcome,

    /// Total duration.
    pub duration: Duration,
}

impl RunReport {
    /// Whether the run completed.
    pub fn success(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    /// Steps touched this run (performed + found applied).
    pub fn steps_processed(&self) -> usize {
        self.applied.len() + self.already_applied.len()
    }
}

/// Builds a [`RunReport`] as the sequencer walks the step list.
pub struct RunReportBuilder {
    target: String,
    started_at: DateTime<Utc>,
    start: std::time::Instant,
    resumed_from: i64,
    applied: Vec<ExecutionResult>,
    already_applied: Vec<ExecutionResult>,
}

impl RunReportBuilder {
    /// Start a report for a run resuming from the given completion index.
    pub fn start(target: &str, resumed_from: i64) -> Self {
        Self {
            target: target.to_string(),
            started_at: Utc::now(),
            start: std::time::Instant::now(),
            resumed_from,
            applied: Vec::new(),
            already_applied: Vec::new(),
        }
    }

    /// Record a step performed this run.
    pub fn step_applied(&mut self, result: ExecutionResult) {
        self.applied.push(result);
    }

    /// Record a step found already applied.
    pub fn step_already_applied(&mut self, result: ExecutionResult) {
        self.already_applied.push(result);
    }

    /// Finish with every pending step processed.
    pub fn finish_completed(self) -> RunReport {
        self.finish(RunOutcome::Completed)
    }

    /// Finish halted at a failing step.
    pub fn finish_halted(self, step_index: u32, label: &str, error: &str) -> RunReport {
        self.finish(RunOutcome::Halted {
            step_index,
            label: label.to_string(),
            error: error.to_string(),
        })
    }

    /// Finish cancelled before the named step.
    pub fn finish_cancelled(self, step_index: u32, label: &str) -> RunReport {
        self.finish(RunOutcome::Cancelled {
            step_index,
            label: label.to_string(),
        })
    }

    fn finish(self, outcome: RunOutcome) -> RunReport {
        RunReport {
            target: self.target,
            started_at: self.started_at,
            resumed_from: self.resumed_from,
            applied: self.applied,
            already_applied: self.already_applied,
            outcome,
            duration: self.start.elapsed(),
        }
    }
}
