//! Step execution with probe-before-act semantics.
//!
//! The runner is the only component that touches the target. It must be
//! safe to call on a step that partially executed in a prior crashed run:
//! target-side evidence is probed before any re-attempt, and an
//! inconclusive probe fails rather than guessing.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{ConvoyError, Result};
use crate::registry::Step;
use crate::target::DeployContext;

use super::action::{DeploymentHandle, ProbeOutcome};

/// Typed outcome of executing one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The action was performed and durably confirmed on the target.
    Applied(DeploymentHandle),

    /// Target-side evidence showed the step was already applied;
    /// nothing was performed.
    AlreadyApplied(DeploymentHandle),

    /// The action failed (including timeouts). The cause is in
    /// [`ExecutionResult::error`].
    Failed,
}

/// Result of executing a step, as seen by the sequencer.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Index of the executed step.
    pub step_index: u32,

    /// Label of the executed step.
    pub label: String,

    /// What happened.
    pub status: ExecutionStatus,

    /// Failure cause when `status` is [`ExecutionStatus::Failed`].
    pub error: Option<String>,

    /// Wall-clock duration of the execution (probe + perform).
    pub duration: Duration,
}

impl ExecutionResult {
    /// Whether the step is now applied on the target (either way).
    pub fn is_applied(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Applied(_) | ExecutionStatus::AlreadyApplied(_)
        )
    }

    /// Handle of the applied deployment, if any.
    pub fn handle(&self) -> Option<&DeploymentHandle> {
        match &self.status {
            ExecutionStatus::Applied(h) | ExecutionStatus::AlreadyApplied(h) => Some(h),
            ExecutionStatus::Failed => None,
        }
    }
}

/// Executes single deployment steps against the target.
///
/// Execution is atomic from the sequencer's point of view: either the
/// result is durably observable on the target and reported as applied, or
/// the step is reported failed. Partial success is never reported as
/// success.
#[derive(Debug, Default)]
pub struct StepRunner;

impl StepRunner {
    /// Create a runner.
    pub fn new() -> Self {
        Self
    }

    /// Execute one step.
    ///
    /// Probes first: `Applied` evidence short-circuits to
    /// [`ExecutionStatus::AlreadyApplied`] without performing anything;
    /// an inconclusive probe is a hard [`ConvoyError::AmbiguousState`]
    /// error requiring operator intervention. Action failures and
    /// timeouts come back as [`ExecutionStatus::Failed`] with the cause.
    pub fn execute(&self, step: &Step, ctx: &DeployContext) -> Result<ExecutionResult> {
        let start = Instant::now();
        debug!(index = step.index, label = %step.label, "probing step");

        match step.action.probe(ctx)? {
            ProbeOutcome::Applied(handle) => {
                info!(index = step.index, label = %step.label, "already applied");
                return Ok(ExecutionResult {
                    step_index: step.index,
                    label: step.label.clone(),
                    status: ExecutionStatus::AlreadyApplied(handle),
                    error: None,
                    duration: start.elapsed(),
                });
            }
            ProbeOutcome::Inconclusive(reason) => {
                return Err(ConvoyError::AmbiguousState {
                    step: step.label.clone(),
                    message: reason,
                });
            }
            ProbeOutcome::NotApplied => {}
        }

        debug!(index = step.index, label = %step.label, "performing step");
        match step.action.perform(ctx) {
            Ok(handle) if handle.confirmed => {
                info!(
                    index = step.index,
                    label = %step.label,
                    address = %handle.address_or_id,
                    "applied"
                );
                Ok(ExecutionResult {
                    step_index: step.index,
                    label: step.label.clone(),
                    status: ExecutionStatus::Applied(handle),
                    error: None,
                    duration: start.elapsed(),
                })
            }
            Ok(handle) => Ok(ExecutionResult {
                step_index: step.index,
                label: step.label.clone(),
                status: ExecutionStatus::Failed,
                error: Some(format!(
                    "deployment of '{}' was broadcast but not confirmed",
                    handle.address_or_id
                )),
                duration: start.elapsed(),
            }),
            Err(e @ (ConvoyError::Timeout { .. } | ConvoyError::Execution { .. })) => {
                Ok(ExecutionResult {
                    step_index: step.index,
                    label: step.label.clone(),
                    status: ExecutionStatus::Failed,
                    error: Some(e.to_string()),
                    duration: start.elapsed(),
                })
            }
            Err(e) => Err(e),
        }
    }
}
