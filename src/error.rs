//! Error types for Convoy operations.
//!
//! This module defines [`ConvoyError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration errors (bad manifest, bad registry) surface before any
//!   step executes and map to exit code 2
//! - Run errors halt the sequencer at the current step with full context
//!   (target, step index, step label, underlying cause) and map to exit code 1
//! - Nothing is swallowed or auto-retried; retry is an explicit re-invocation
//!   relying on idempotent resume

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Convoy operations.
#[derive(Debug, Error)]
pub enum ConvoyError {
    /// Deploy manifest not found at expected location.
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Failed to parse the deploy manifest.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Invalid manifest structure or values.
    #[error("Invalid manifest: {message}")]
    ManifestValidation { message: String },

    /// Referenced target is not declared in the manifest.
    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    /// Two registered steps share an index.
    #[error("Duplicate step index {index} ('{label}')")]
    DuplicateIndex { index: u32, label: String },

    /// Step indices are not strictly increasing.
    #[error("Step index {index} ('{label}') is not greater than the preceding index {prev}")]
    UnorderedIndex { index: u32, prev: u32, label: String },

    /// Completion store unreadable or corrupt. Never interpreted as
    /// "nothing applied".
    #[error("Storage error for target '{target}': {message}")]
    Storage { target: String, message: String },

    /// Rejected completion update that would not strictly increase the
    /// recorded index.
    #[error(
        "Out-of-order completion update for target '{target}': \
         attempted index {attempted}, already at {current}"
    )]
    OutOfOrderUpdate {
        target: String,
        current: i64,
        attempted: i64,
    },

    /// A probe could not determine whether a step was already applied.
    /// Requires operator intervention; the runner never guesses.
    #[error("Ambiguous target state at step '{step}': {message}")]
    AmbiguousState { step: String, message: String },

    /// A step exceeded its execution deadline. Treated as a failed step,
    /// never as already-applied.
    #[error("Step '{step}' timed out after {seconds}s")]
    Timeout { step: String, seconds: u64 },

    /// The deployment action itself failed.
    #[error("Step '{step}' failed: {message}")]
    Execution { step: String, message: String },

    /// Another run already holds the lock for this target.
    #[error("Target '{target}' is locked by another run: {message}")]
    TargetLocked { target: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvoyError {
    /// Whether this error was raised before any step executed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ConvoyError::ManifestNotFound { .. }
                | ConvoyError::ManifestParse { .. }
                | ConvoyError::ManifestValidation { .. }
                | ConvoyError::UnknownTarget { .. }
                | ConvoyError::DuplicateIndex { .. }
                | ConvoyError::UnorderedIndex { .. }
        )
    }
}

/// Result type alias for Convoy operations.
pub type Result<T> = std::result::Result<T, ConvoyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_not_found_displays_path() {
        let err = ConvoyError::ManifestNotFound {
            path: PathBuf::from("/work/convoy.yml"),
        };
        assert!(err.to_string().contains("/work/convoy.yml"));
    }

    #[test]
    fn manifest_parse_displays_path_and_message() {
        let err = ConvoyError::ManifestParse {
            path: PathBuf::from("/convoy.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/convoy.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn duplicate_index_displays_index_and_label() {
        let err = ConvoyError::DuplicateIndex {
            index: 3,
            label: "issuance".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains("issuance"));
    }

    #[test]
    fn unordered_index_displays_both_indices() {
        let err = ConvoyError::UnorderedIndex {
            index: 1,
            prev: 4,
            label: "registry".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains('1'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn out_of_order_update_displays_indices() {
        let err = ConvoyError::OutOfOrderUpdate {
            target: "goerli".into(),
            current: 5,
            attempted: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("goerli"));
        assert!(msg.contains('5'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn ambiguous_state_displays_step_and_message() {
        let err = ConvoyError::AmbiguousState {
            step: "issuance".into(),
            message: "probe exited with signal".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("issuance"));
        assert!(msg.contains("probe exited with signal"));
    }

    #[test]
    fn timeout_displays_step_and_seconds() {
        let err = ConvoyError::Timeout {
            step: "issuance".into(),
            seconds: 120,
        };
        let msg = err.to_string();
        assert!(msg.contains("issuance"));
        assert!(msg.contains("120"));
    }

    #[test]
    fn configuration_classification() {
        let config = ConvoyError::ManifestValidation {
            message: "empty steps".into(),
        };
        assert!(config.is_configuration());

        let run = ConvoyError::Execution {
            step: "issuance".into(),
            message: "deploy script failed".into(),
        };
        assert!(!run.is_configuration());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ConvoyError = io_err.into();
        assert!(matches!(err, ConvoyError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(ConvoyError::UnknownTarget {
                name: "mainnet".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
