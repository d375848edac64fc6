//! The ordered step list.
//!
//! An [`ActionRegistry`] is pure data: the caller's ordered deployment
//! steps, validated once at construction. All control flow lives in the
//! sequencer; the registry only answers "which steps, in what order".

use crate::error::{ConvoyError, Result};
use crate::steps::Action;

/// One indexed, idempotent deployment step. Immutable once registered.
pub struct Step {
    /// Unique index defining the total order. Gaps are fine; only the
    /// ordering matters.
    pub index: u32,

    /// Human-readable name, used in reports and error context.
    pub label: String,

    /// The opaque deployment action.
    pub action: Box<dyn Action>,
}

impl Step {
    /// Create a step.
    pub fn new(index: u32, label: impl Into<String>, action: Box<dyn Action>) -> Self {
        Self {
            index,
            label: label.into(),
            action,
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("index", &self.index)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// The ordered list of deployment steps for a run.
///
/// Construction fails fast on duplicate or unordered indices; that is a
/// configuration error and must be caught before any step executes.
#[derive(Debug)]
pub struct ActionRegistry {
    steps: Vec<Step>,
}

impl ActionRegistry {
    /// Build a registry, validating that indices are unique and strictly
    /// increasing.
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let mut prev: Option<u32> = None;
        for step in &steps {
            match prev {
                Some(p) if step.index == p => {
                    return Err(ConvoyError::DuplicateIndex {
                        index: step.index,
                        label: step.label.clone(),
                    });
                }
                Some(p) if step.index < p => {
                    return Err(ConvoyError::UnorderedIndex {
                        index: step.index,
                        prev: p,
                        label: step.label.clone(),
                    });
                }
                _ => {}
            }
            prev = Some(step.index);
        }

        Ok(Self { steps })
    }

    /// All registered steps in index order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps with index strictly greater than `last`, in ascending order.
    /// This is the resume point: `last` is the stored completion index,
    /// -1 for a fresh target.
    pub fn pending_after(&self, last: i64) -> impl Iterator<Item = &Step> {
        self.steps
            .iter()
            .filter(move |s| i64::from(s.index) > last)
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the registry has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
