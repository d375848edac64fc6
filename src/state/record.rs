//! Completion record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel meaning no step has ever completed on a target.
pub const NOTHING_APPLIED: i64 = -1;

/// Durable marker of deployment progress for one target.
///
/// Created on the first successful step, read-modified-written after every
/// success, and never deleted by the tool: removing it would force a full
/// redeployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Schema version for migration.
    pub version: u32,

    /// Target name this record belongs to.
    pub target: String,

    /// Highest step index successfully completed. Only ever increases.
    pub last_completed_index: i64,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,

    /// Steps applied to this target, in completion order.
    #[serde(default)]
    pub applied: Vec<AppliedStep>,
}

/// One applied step, as recorded at completion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedStep {
    /// Step index.
    pub index: u32,

    /// Human-readable step label.
    pub label: String,

    /// Address or identifier of what the step deployed.
    pub address_or_id: String,

    /// When the step completed.
    pub applied_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create an empty record for a target.
    pub fn new(target: &str) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            target: target.to_string(),
            last_completed_index: NOTHING_APPLIED,
            updated_at: Utc::now(),
            applied: Vec::new(),
        }
    }

    /// Look up the applied entry for a step index.
    pub fn applied_step(&self, index: u32) -> Option<&AppliedStep> {
        self.applied.iter().find(|s| s.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_at_sentinel() {
        let record = CompletionRecord::new("local");
        assert_eq!(record.last_completed_index, NOTHING_APPLIED);
        assert!(record.applied.is_empty());
        assert_eq!(record.version, CompletionRecord::CURRENT_VERSION);
    }

    #[test]
    fn applied_step_lookup() {
        let mut record = CompletionRecord::new("local");
        record.applied.push(AppliedStep {
            index: 0,
            label: "migrations".into(),
            address_or_id: "0xabc".into(),
            applied_at: Utc::now(),
        });

        assert_eq!(record.applied_step(0).unwrap().address_or_id, "0xabc");
        assert!(record.applied_step(1).is_none());
    }

    #[test]
    fn record_round_trips_through_yaml() {
        let mut record = CompletionRecord::new("sepolia");
        record.last_completed_index = 2;
        record.applied.push(AppliedStep {
            index: 2,
            label: "issuance".into(),
            address_or_id: "0xdef".into(),
            applied_at: Utc::now(),
        });

        let yaml = serde_yaml::to_string(&record).unwrap();
        let parsed: CompletionRecord = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.target, "sepolia");
        assert_eq!(parsed.last_completed_index, 2);
        assert_eq!(parsed.applied.len(), 1);
    }
}
