//! Run command implementation.
//!
//! Applies every pending step to the chosen target: loads and validates
//! the manifest, takes the per-target run lock, and hands the compiled
//! registry to the sequencer. Exit code 0 on Completed, 1 on Halted.

use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use tracing::{debug, warn};

use crate::cli::args::RunArgs;
use crate::error::{ConvoyError, Result};
use crate::manifest::{find_manifest, load_manifest};
use crate::sequencer::{CancelFlag, RunProgress, Sequencer};
use crate::state::FileStore;
use crate::target::TargetId;
use crate::ui::Reporter;

use super::dispatcher::{Command, CommandResult};

/// The `run` command.
pub struct RunCommand {
    project_root: PathBuf,
    manifest_path: PathBuf,
    args: RunArgs,
}

impl RunCommand {
    /// Create a run command.
    pub fn new(project_root: &Path, manifest_path: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            manifest_path: find_manifest(project_root, manifest_path),
            args,
        }
    }

    /// Take the exclusive per-target run lock.
    ///
    /// This keeps concurrent local runs against the same target out, which
    /// is required: two sequencers interleaving on one target could both
    /// pass the store read before either records. The lock is advisory and
    /// local to this host; exclusion across hosts is the operator's
    /// responsibility.
    fn acquire_lock(&self, target: &TargetId) -> Result<File> {
        let dir = self.project_root.join(".convoy").join("locks");
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.lock", target.hash()));
        let file = File::create(&path)?;
        file.try_lock_exclusive()
            .map_err(|e| ConvoyError::TargetLocked {
                target: target.name().to_string(),
                message: e.to_string(),
            })?;
        debug!(target = %target.name(), path = %path.display(), "acquired run lock");
        Ok(file)
    }
}

impl Command for RunCommand {
    fn execute(&self, reporter: &Reporter) -> Result<CommandResult> {
        let manifest = load_manifest(&self.manifest_path)?;
        let registry = manifest.to_registry()?;

        let mut ctx = manifest.context_for(&self.args.target, &self.project_root)?;
        if let Some(secs) = self.args.timeout {
            ctx = ctx.with_default_timeout(Some(Duration::from_secs(secs)));
        }

        let _lock = self.acquire_lock(ctx.target())?;

        let cancel = CancelFlag::new();
        let handler_flag = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
            warn!(error = %e, "could not install Ctrl-C handler");
        }

        if let Some(project) = &manifest.project {
            reporter.status(&format!(
                "Deploying '{}' to target '{}'",
                project, self.args.target
            ));
        }

        let mut store = FileStore::new(&self.project_root);
        let mut sequencer = Sequencer::new(&registry);
        let report =
            sequencer.run_with_progress(&mut store, &ctx, &cancel, |event| match event {
                RunProgress::StepStarting {
                    index,
                    label,
                    position,
                    total,
                } => reporter.step_starting(index, label, position, total),
                RunProgress::StepFinished { result } => reporter.step_finished(result),
            })?;

        let exit_code = reporter.run_summary(&report);
        if exit_code == 0 {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(exit_code))
        }
    }
}
