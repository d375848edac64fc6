//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::Reporter;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, writing output through the reporter.
    fn execute(&self, reporter: &Reporter) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 success, 1 halted run, 2 configuration error).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    manifest_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf, manifest_path: Option<PathBuf>) -> Self {
        Self {
            project_root,
            manifest_path,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, reporter: &Reporter) -> Result<CommandResult> {
        match &cli.command {
            Commands::Run(args) => {
                let cmd = super::run::RunCommand::new(
                    &self.project_root,
                    self.manifest_path.as_deref(),
                    args.clone(),
                );
                cmd.execute(reporter)
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(
                    &self.project_root,
                    self.manifest_path.as_deref(),
                    args.clone(),
                );
                cmd.execute(reporter)
            }
            Commands::Plan(args) => {
                let cmd = super::plan::PlanCommand::new(
                    &self.project_root,
                    self.manifest_path.as_deref(),
                    args.clone(),
                );
                cmd.execute(reporter)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(reporter)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure_carries_code() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn dispatcher_stores_project_root() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/work"), None);
        assert_eq!(dispatcher.project_root(), Path::new("/work"));
    }
}
