//! Plan command implementation.
//!
//! Validates the manifest and lists every step with its pending/applied
//! marker for a target, without executing anything. This is the pre-run
//! check: every configuration error `run` would hit surfaces here.

use std::path::{Path, PathBuf};

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::manifest::{find_manifest, load_manifest};
use crate::state::{CompletionStore, FileStore};
use crate::ui::Reporter;

use super::dispatcher::{Command, CommandResult};

/// The `plan` command.
pub struct PlanCommand {
    project_root: PathBuf,
    manifest_path: PathBuf,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a plan command.
    pub fn new(project_root: &Path, manifest_path: Option<&Path>, args: PlanArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            manifest_path: find_manifest(project_root, manifest_path),
            args,
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, reporter: &Reporter) -> Result<CommandResult> {
        let manifest = load_manifest(&self.manifest_path)?;
        let registry = manifest.to_registry()?;
        let ctx = manifest.context_for(&self.args.target, &self.project_root)?;

        let store = FileStore::new(&self.project_root);
        let last = store.last_completed(ctx.target())?;

        let pending = registry.pending_after(last).count();
        reporter.status(&format!(
            "Target '{}': {} steps, {} pending (last completed index {})",
            self.args.target,
            registry.len(),
            pending,
            last
        ));

        for step in registry.steps() {
            let marker = if i64::from(step.index) > last {
                "pending"
            } else {
                "applied"
            };
            reporter.status(&format!("  {:>3}  {:<24} {}", step.index, step.label, marker));
        }

        Ok(CommandResult::success())
    }
}
