//! Durable per-target deployment progress.
//!
//! This module persists, for each target, the highest step index that has
//! completed successfully. The sequencer's crash recovery depends entirely
//! on this record being durable and monotonic.

pub mod record;
pub mod store;

pub use record::{AppliedStep, CompletionRecord, NOTHING_APPLIED};
pub use store::{CompletionStore, FileStore};
