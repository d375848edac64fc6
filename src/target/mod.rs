//! Target identification and per-run deployment context.

pub mod context;
pub mod id;

pub use context::DeployContext;
pub use id::TargetId;
