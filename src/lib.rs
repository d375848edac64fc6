//! Convoy - resumable migration sequencer for contract deployments.
//!
//! Convoy applies an ordered list of deployment steps to a stateful target
//! (a blockchain network) exactly once each. Progress is recorded durably
//! per target, so a run that fails or is interrupted resumes exactly at
//! the first unapplied step on the next invocation.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result alias
//! - [`manifest`] - Deploy manifest loading, parsing, and validation
//! - [`registry`] - The ordered, validated step list
//! - [`sequencer`] - Ordered, exactly-once step application
//! - [`shell`] - Shell command execution with deadlines
//! - [`state`] - Durable per-target completion records
//! - [`steps`] - The action seam and the step runner
//! - [`target`] - Target identity and per-run deployment context
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```no_run
//! use convoy::manifest::load_manifest;
//! use convoy::sequencer::{CancelFlag, Sequencer};
//! use convoy::state::FileStore;
//!
//! # fn main() -> convoy::Result<()> {
//! let manifest = load_manifest(std::path::Path::new("convoy.yml"))?;
//! let registry = manifest.to_registry()?;
//! let ctx = manifest.context_for("local", ".")?;
//!
//! let mut store = FileStore::new(".");
//! let mut sequencer = Sequencer::new(&registry);
//! let report = sequencer.run(&mut store, &ctx, &CancelFlag::new())?;
//! assert!(report.success());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod sequencer;
pub mod shell;
pub mod state;
pub mod steps;
pub mod target;
pub mod ui;

pub use error::{ConvoyError, Result};
