//! Step execution: the action seam, the command-backed action, and the
//! step runner.
//!
//! - [`Action`] - what a deployment step does and how to probe for it
//! - [`CommandAction`] - shell-command-backed action built from the manifest
//! - [`StepRunner`] - probe-before-act execution with typed outcomes
//! - [`ExecutionResult`] / [`ExecutionStatus`] - what the sequencer sees

pub mod action;
pub mod command;
pub mod runner;

pub use action::{Action, DeploymentHandle, ProbeOutcome};
pub use command::{CommandAction, ProbeSpec};
pub use runner::{ExecutionResult, ExecutionStatus, StepRunner};
