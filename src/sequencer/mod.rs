//! Ordered, exactly-once application of deployment steps.
//!
//! The sequencer is the interpreter for the declarative step list: it reads
//! the target's completion index, executes only the steps past it in
//! ascending order, records each success durably before moving on, and
//! halts at the first failure. Re-invocation after a halt (or after
//! completion) is idempotent: it re-reads the completion index and resumes
//! exactly at the first unapplied step.
//!
//! Steps run strictly sequentially; step N+1 never begins before step N's
//! completion is durably recorded, because later steps may depend on
//! addresses produced by earlier ones. Concurrent runs against the same
//! target are unsafe; callers must hold a mutual-exclusion lock for the
//! duration of a run (the CLI takes a per-target advisory file lock, which
//! covers local processes; cross-host exclusion is the operator's
//! responsibility).

pub mod report;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::Result;
use crate::registry::ActionRegistry;
use crate::state::{AppliedStep, CompletionStore};
use crate::steps::{ExecutionResult, ExecutionStatus, StepRunner};
use crate::target::DeployContext;

pub use report::{RunOutcome, RunReport, RunReportBuilder};

/// Sequencer lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run started yet (or a new run is about to re-read the store).
    Idle,

    /// A run is walking the step list.
    Running,

    /// Last run processed every pending step.
    Completed,

    /// Last run stopped early (step failure or cancellation).
    Halted,
}

/// Cooperative cancellation flag, checked between steps only.
///
/// Cancellation never interrupts an in-flight `execute`: killing an action
/// mid-deployment would leave the target in an undeterminable state. The
/// in-flight step finishes (or fails) and the run stops before the next
/// one starts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to execute.
    StepStarting {
        index: u32,
        label: &'a str,
        position: usize,
        total: usize,
    },
    /// A step finished (applied, already applied, or failed).
    StepFinished { result: &'a ExecutionResult },
}

/// Orchestrates ordered, exactly-once application of a step list to a
/// target.
pub struct Sequencer<'a> {
    registry: &'a ActionRegistry,
    runner: StepRunner,
    phase: RunPhase,
}

impl<'a> Sequencer<'a> {
    /// Create a sequencer for a registry.
    pub fn new(registry: &'a ActionRegistry) -> Self {
        Self {
            registry,
            runner: StepRunner::new(),
            phase: RunPhase::Idle,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Run all pending steps against the context's target.
    pub fn run(
        &mut self,
        store: &mut dyn CompletionStore,
        ctx: &DeployContext,
        cancel: &CancelFlag,
    ) -> Result<RunReport> {
        self.run_with_progress(store, ctx, cancel, |_| {})
    }

    /// Run all pending steps, emitting progress events.
    pub fn run_with_progress(
        &mut self,
        store: &mut dyn CompletionStore,
        ctx: &DeployContext,
        cancel: &CancelFlag,
        mut progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunReport> {
        let target = ctx.target();
        let registry = self.registry;
        self.phase = RunPhase::Running;

        let last = match store.last_completed(target) {
            Ok(last) => last,
            Err(e) => {
                self.phase = RunPhase::Halted;
                return Err(e);
            }
        };
        let total = registry.pending_after(last).count();
        info!(
            target = %target.name(),
            resumed_from = last,
            pending = total,
            "starting run"
        );

        let mut builder = RunReportBuilder::start(target.name(), last);

        for (position, step) in registry.pending_after(last).enumerate() {
            if cancel.is_cancelled() {
                warn!(target = %target.name(), index = step.index, "run cancelled");
                self.phase = RunPhase::Halted;
                return Ok(builder.finish_cancelled(step.index, &step.label));
            }

            progress(RunProgress::StepStarting {
                index: step.index,
                label: &step.label,
                position,
                total,
            });

            let result = match self.runner.execute(step, ctx) {
                Ok(result) => result,
                Err(e) => {
                    self.phase = RunPhase::Halted;
                    return Err(e);
                }
            };
            progress(RunProgress::StepFinished { result: &result });

            match result.status.clone() {
                ExecutionStatus::Applied(handle) => {
                    self.record(store, ctx, step.index, &result.label, &handle.address_or_id)?;
                    builder.step_applied(result);
                }
                ExecutionStatus::AlreadyApplied(handle) => {
                    // The store lagged behind actual target state (for
                    // example, a crash after broadcast but before the
                    // record write). Credit the step so the next run
                    // doesn't probe it again.
                    self.record(store, ctx, step.index, &result.label, &handle.address_or_id)?;
                    builder.step_already_applied(result);
                }
                ExecutionStatus::Failed => {
                    let error = result
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown failure".to_string());
                    warn!(
                        target = %target.name(),
                        index = result.step_index,
                        label = %result.label,
                        error = %error,
                        "halting run"
                    );
                    self.phase = RunPhase::Halted;
                    return Ok(builder.finish_halted(result.step_index, &result.label, &error));
                }
            }
        }

        self.phase = RunPhase::Completed;
        info!(target = %target.name(), "run completed");
        Ok(builder.finish_completed())
    }

    fn record(
        &mut self,
        store: &mut dyn CompletionStore,
        ctx: &DeployContext,
        index: u32,
        label: &str,
        address_or_id: &str,
    ) -> Result<()> {
        let applied = AppliedStep {
            index,
            label: label.to_string(),
            address_or_id: address_or_id.to_string(),
            applied_at: Utc::now(),
        };
        store
            .record_completed(ctx.target(), index, applied)
            .map_err(|e| {
                self.phase = RunPhase::Halted;
                e
            })
    }
}
