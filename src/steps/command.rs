//! Shell-command-backed deployment action.
//!
//! This is the action the manifest compiles to: the step's `run:` command
//! performs the deployment (carrying its own signing and transport
//! concerns), and the optional `check:` probes for prior application.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::error::{ConvoyError, Result};
use crate::shell::{execute, CommandOptions};
use crate::target::DeployContext;

use super::action::{Action, DeploymentHandle, ProbeOutcome};

/// How a command step probes for prior application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeSpec {
    /// Applied when the file or directory exists, relative to the
    /// project root (e.g. a written deployment artifact).
    FileExists { path: String },

    /// Applied when the command exits 0 (e.g. a script that queries the
    /// target for the expected contract code).
    CommandSucceeds { command: String },
}

/// A deployment step that shells out to the user's own tooling.
pub struct CommandAction {
    /// Step label, used in error context.
    label: String,

    /// The deployment command.
    run: String,

    /// Already-applied probe. A step without one always probes NotApplied;
    /// its crash-resume safety rests on the command's own idempotence.
    probe: Option<ProbeSpec>,

    /// Step-level environment, merged over the target's.
    env: HashMap<String, String>,

    /// Step-level deadline, overriding the context default.
    timeout: Option<Duration>,
}

impl CommandAction {
    /// Create a command action.
    pub fn new(label: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            run: run.into(),
            probe: None,
            env: HashMap::new(),
            timeout: None,
        }
    }

    /// Attach an already-applied probe.
    pub fn with_probe(mut self, probe: ProbeSpec) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Merge step-level environment variables.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Set the step-level deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn effective_timeout(&self, ctx: &DeployContext) -> Option<Duration> {
        self.timeout.or(ctx.default_timeout())
    }

    fn command_options(&self, ctx: &DeployContext) -> CommandOptions {
        let mut env = ctx.child_env();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        CommandOptions {
            cwd: Some(ctx.project_root().to_path_buf()),
            env,
            timeout: self.effective_timeout(ctx),
        }
    }
}

impl Action for CommandAction {
    fn perform(&self, ctx: &DeployContext) -> Result<DeploymentHandle> {
        let options = self.command_options(ctx);
        debug!(step = %self.label, command = %self.run, "performing deployment command");

        let result = execute(&self.run, &options)?;

        if result.timed_out {
            let seconds = self
                .effective_timeout(ctx)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            return Err(ConvoyError::Timeout {
                step: self.label.clone(),
                seconds,
            });
        }

        if !result.success {
            let detail = last_nonempty_line(&result.stderr)
                .or_else(|| last_nonempty_line(&result.stdout))
                .unwrap_or_else(|| "no output".to_string());
            return Err(ConvoyError::Execution {
                step: self.label.clone(),
                message: format!(
                    "command exited with code {:?}: {}",
                    result.exit_code, detail
                ),
            });
        }

        // The deployed address is whatever the command last printed;
        // fall back to the label for commands that print nothing.
        let address_or_id =
            last_nonempty_line(&result.stdout).unwrap_or_else(|| self.label.clone());

        Ok(DeploymentHandle::confirmed(address_or_id))
    }

    fn probe(&self, ctx: &DeployContext) -> Result<ProbeOutcome> {
        let Some(probe) = &self.probe else {
            return Ok(ProbeOutcome::NotApplied);
        };

        match probe {
            ProbeSpec::FileExists { path } => {
                let full = if std::path::Path::new(path).is_absolute() {
                    std::path::PathBuf::from(path)
                } else {
                    ctx.project_root().join(path)
                };
                if full.exists() {
                    Ok(ProbeOutcome::Applied(DeploymentHandle::confirmed(
                        full.display().to_string(),
                    )))
                } else {
                    Ok(ProbeOutcome::NotApplied)
                }
            }
            ProbeSpec::CommandSucceeds { command } => {
                let options = self.command_options(ctx);
                match execute(command, &options) {
                    Ok(result) if result.timed_out => Ok(ProbeOutcome::Inconclusive(format!(
                        "probe command timed out: {}",
                        command
                    ))),
                    Ok(result) if result.success => {
                        let id = last_nonempty_line(&result.stdout)
                            .unwrap_or_else(|| self.label.clone());
                        Ok(ProbeOutcome::Applied(DeploymentHandle::confirmed(id)))
                    }
                    Ok(_) => Ok(ProbeOutcome::NotApplied),
                    Err(e) => Ok(ProbeOutcome::Inconclusive(format!(
                        "probe command could not run: {}",
                        e
                    ))),
                }
            }
        }
    }
}

fn last_nonempty_line(output: &str) -> Option<String> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(String::from)
}
