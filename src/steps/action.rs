//! The action interface.
//!
//! An action is the opaque "what" of a step: deploy this contract, register
//! that address. The sequencer never looks inside; it only needs the two
//! operations here. The signing and transport concerns live behind the
//! action (in the CLI surface, inside the user's own deploy command).

use crate::error::Result;
use crate::target::DeployContext;

/// Handle to something a step deployed on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentHandle {
    /// Address or identifier of the deployed artifact.
    pub address_or_id: String,

    /// Whether the deployment is durably observable on the target.
    /// An unconfirmed handle is never treated as success.
    pub confirmed: bool,
}

impl DeploymentHandle {
    /// Create a confirmed handle.
    pub fn confirmed(address_or_id: impl Into<String>) -> Self {
        Self {
            address_or_id: address_or_id.into(),
            confirmed: true,
        }
    }

    /// Create an unconfirmed handle (broadcast but not observable yet).
    pub fn unconfirmed(address_or_id: impl Into<String>) -> Self {
        Self {
            address_or_id: address_or_id.into(),
            confirmed: false,
        }
    }
}

/// What a probe found on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Target-side evidence says the step is already applied.
    Applied(DeploymentHandle),

    /// No evidence of prior application; safe to perform.
    NotApplied,

    /// The probe could not tell. The runner fails rather than guessing:
    /// a prior run may have broadcast a transaction that never confirmed.
    Inconclusive(String),
}

/// One deployment action against a target.
pub trait Action {
    /// Perform the action. Returns a handle to the deployed artifact;
    /// `confirmed` must only be true once the result is durably observable
    /// on the target.
    fn perform(&self, ctx: &DeployContext) -> Result<DeploymentHandle>;

    /// Probe target-side evidence for a prior application of this action.
    /// Called before `perform` so a step that partially executed in a
    /// crashed run is never re-applied blindly.
    fn probe(&self, ctx: &DeployContext) -> Result<ProbeOutcome>;
}
