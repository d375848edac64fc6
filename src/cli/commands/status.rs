//! Status command implementation.
//!
//! Prints the completion record for a target: how far deployment has
//! progressed and which addresses each applied step produced.

use std::path::{Path, PathBuf};

use crate::cli::args::StatusArgs;
use crate::error::Result;
use crate::manifest::{find_manifest, load_manifest};
use crate::state::{CompletionStore, FileStore};
use crate::ui::Reporter;

use super::dispatcher::{Command, CommandResult};

/// The `status` command.
pub struct StatusCommand {
    project_root: PathBuf,
    manifest_path: PathBuf,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a status command.
    pub fn new(project_root: &Path, manifest_path: Option<&Path>, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            manifest_path: find_manifest(project_root, manifest_path),
            args,
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, reporter: &Reporter) -> Result<CommandResult> {
        let manifest = load_manifest(&self.manifest_path)?;
        let ctx = manifest.context_for(&self.args.target, &self.project_root)?;

        let store = FileStore::new(&self.project_root);
        let record = store.record(ctx.target())?;

        match record {
            Some(record) if self.args.json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&record).map_err(anyhow::Error::from)?
                );
            }
            Some(record) => {
                reporter.status(&format!(
                    "Target '{}': last completed index {} (updated {})",
                    record.target,
                    record.last_completed_index,
                    record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                ));
                for step in &record.applied {
                    reporter.status(&format!(
                        "  {} '{}' -> {}",
                        step.index, step.label, step.address_or_id
                    ));
                }
            }
            None if self.args.json => {
                println!("null");
            }
            None => {
                reporter.status(&format!(
                    "Target '{}': nothing applied yet",
                    self.args.target
                ));
            }
        }

        Ok(CommandResult::success())
    }
}
