//! Deploy manifest: the declarative deploy plan.
//!
//! The manifest (`convoy.yml`) declares targets and the ordered step list.
//! It is pure configuration; loading and validation happen before any step
//! executes, and the validated manifest compiles into an
//! [`ActionRegistry`](crate::registry::ActionRegistry) of command-backed
//! steps.

pub mod loader;
pub mod schema;

pub use loader::{find_manifest, load_manifest, DEFAULT_MANIFEST_NAME};
pub use schema::{CheckConfig, Manifest, StepConfig, TargetConfig};
