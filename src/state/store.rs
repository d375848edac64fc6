//! Completion store: trait seam and file-backed implementation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::error::{ConvoyError, Result};
use crate::target::TargetId;

use super::record::{AppliedStep, CompletionRecord, NOTHING_APPLIED};

/// Persists "highest step index successfully completed" per target.
///
/// The file-backed [`FileStore`] is the default; on-chain or external
/// metadata-store backends plug in through this trait. Implementations
/// must be durable across process restarts and must enforce the monotonic
/// guard in `record_completed`. Backends that reach the store over a
/// network must bound their own I/O with a deadline and surface the
/// expiry as [`ConvoyError::Storage`]; a hung store read would otherwise
/// stall the run indefinitely.
pub trait CompletionStore {
    /// Highest completed index for a target, or [`NOTHING_APPLIED`] (-1)
    /// when no record exists.
    ///
    /// An unreadable or corrupt record is a [`ConvoyError::Storage`] error,
    /// never -1: misreading corruption as "nothing applied" would replay
    /// every step.
    fn last_completed(&self, target: &TargetId) -> Result<i64>;

    /// Record completion of a step. Fails with
    /// [`ConvoyError::OutOfOrderUpdate`] and leaves the store unchanged
    /// unless `index` is strictly greater than the stored value.
    fn record_completed(&mut self, target: &TargetId, index: u32, applied: AppliedStep)
        -> Result<()>;

    /// Full record for a target, if one exists.
    fn record(&self, target: &TargetId) -> Result<Option<CompletionRecord>>;
}

/// File-backed completion store.
///
/// One YAML record per target at
/// `<project>/.convoy/deployments/<target-hash>.yml`, written with the
/// write-to-temp-then-rename pattern so a crash mid-write never leaves a
/// partially written record. Compare-and-set is load-compare-write; the
/// run lock held by the CLI keeps concurrent local writers out.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given project directory.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            root: project_root.into(),
        }
    }

    /// Directory holding all completion records for this project.
    pub fn deployments_dir(&self) -> PathBuf {
        self.root.join(".convoy").join("deployments")
    }

    /// Path of the record file for a target.
    pub fn record_file(&self, target: &TargetId) -> PathBuf {
        self.deployments_dir().join(format!("{}.yml", target.hash()))
    }

    fn load(&self, target: &TargetId) -> Result<Option<CompletionRecord>> {
        let path = self.record_file(target);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| storage_err(target, &path, e))?;
        let record: CompletionRecord =
            serde_yaml::from_str(&content).map_err(|e| storage_err(target, &path, e))?;
        Ok(Some(record))
    }

    fn save(&self, target: &TargetId, record: &CompletionRecord) -> Result<()> {
        let dir = self.deployments_dir();
        fs::create_dir_all(&dir).map_err(|e| storage_err(target, &dir, e))?;

        let path = self.record_file(target);
        let content =
            serde_yaml::to_string(record).map_err(|e| storage_err(target, &path, e))?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("yml.tmp");
        fs::write(&temp_path, &content).map_err(|e| storage_err(target, &temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| storage_err(target, &path, e))?;

        Ok(())
    }
}

impl CompletionStore for FileStore {
    fn last_completed(&self, target: &TargetId) -> Result<i64> {
        Ok(self
            .load(target)?
            .map(|r| r.last_completed_index)
            .unwrap_or(NOTHING_APPLIED))
    }

    fn record_completed(
        &mut self,
        target: &TargetId,
        index: u32,
        applied: AppliedStep,
    ) -> Result<()> {
        let mut record = self
            .load(target)?
            .unwrap_or_else(|| CompletionRecord::new(target.name()));

        let attempted = i64::from(index);
        if attempted <= record.last_completed_index {
            return Err(ConvoyError::OutOfOrderUpdate {
                target: target.name().to_string(),
                current: record.last_completed_index,
                attempted,
            });
        }

        record.last_completed_index = attempted;
        record.updated_at = Utc::now();
        record.applied.push(applied);

        self.save(target, &record)?;
        debug!(target = %target.name(), index, "recorded step completion");
        Ok(())
    }

    fn record(&self, target: &TargetId) -> Result<Option<CompletionRecord>> {
        self.load(target)
    }
}

fn storage_err(target: &TargetId, path: &Path, cause: impl std::fmt::Display) -> ConvoyError {
    ConvoyError::Storage {
        target: target.name().to_string(),
        message: format!("{}: {}", path.display(), cause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn applied(index: u32) -> AppliedStep {
        AppliedStep {
            index,
            label: format!("step-{}", index),
            address_or_id: format!("0x{:040x}", index),
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn last_completed_is_sentinel_without_record() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        let last = store.last_completed(&TargetId::new("local")).unwrap();
        assert_eq!(last, NOTHING_APPLIED);
    }

    #[test]
    fn record_completed_persists_and_reloads() {
        let temp = TempDir::new().unwrap();
        let target = TargetId::new("local");

        let mut store = FileStore::new(temp.path());
        store.record_completed(&target, 0, applied(0)).unwrap();

        // Fresh store instance: durability across restart
        let reopened = FileStore::new(temp.path());
        assert_eq!(reopened.last_completed(&target).unwrap(), 0);

        let record = reopened.record(&target).unwrap().unwrap();
        assert_eq!(record.applied.len(), 1);
        assert_eq!(record.applied[0].label, "step-0");
    }

    #[test]
    fn record_completed_enforces_monotonicity() {
        let temp = TempDir::new().unwrap();
        let target = TargetId::new("local");

        let mut store = FileStore::new(temp.path());
        store.record_completed(&target, 2, applied(2)).unwrap();

        // Equal index rejected
        let err = store.record_completed(&target, 2, applied(2)).unwrap_err();
        assert!(matches!(err, ConvoyError::OutOfOrderUpdate { current: 2, attempted: 2, .. }));

        // Lower index rejected
        let err = store.record_completed(&target, 1, applied(1)).unwrap_err();
        assert!(matches!(err, ConvoyError::OutOfOrderUpdate { .. }));

        // Store unchanged after rejections
        assert_eq!(store.last_completed(&target).unwrap(), 2);
        assert_eq!(store.record(&target).unwrap().unwrap().applied.len(), 1);
    }

    #[test]
    fn record_completed_accepts_gapped_indices() {
        let temp = TempDir::new().unwrap();
        let target = TargetId::new("local");

        let mut store = FileStore::new(temp.path());
        store.record_completed(&target, 0, applied(0)).unwrap();
        store.record_completed(&target, 10, applied(10)).unwrap();

        assert_eq!(store.last_completed(&target).unwrap(), 10);
    }

    #[test]
    fn corrupt_record_surfaces_storage_error() {
        let temp = TempDir::new().unwrap();
        let target = TargetId::new("local");
        let store = FileStore::new(temp.path());

        fs::create_dir_all(store.deployments_dir()).unwrap();
        fs::write(store.record_file(&target), "{not yaml: [").unwrap();

        let err = store.last_completed(&target).unwrap_err();
        assert!(matches!(err, ConvoyError::Storage { .. }));
    }

    #[test]
    fn targets_are_isolated() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());

        let local = TargetId::new("local");
        let sepolia = TargetId::new("sepolia");

        store.record_completed(&local, 3, applied(3)).unwrap();

        assert_eq!(store.last_completed(&local).unwrap(), 3);
        assert_eq!(store.last_completed(&sepolia).unwrap(), NOTHING_APPLIED);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let target = TargetId::new("local");

        let mut store = FileStore::new(temp.path());
        store.record_completed(&target, 0, applied(0)).unwrap();

        let temp_path = store.record_file(&target).with_extension("yml.tmp");
        assert!(!temp_path.exists());
    }
}
