//! Error handling for the fee pipeline
//!
//! Defines the typed errors surfaced to the user at each pipeline boundary.
//! Internal parsing helpers use anyhow for context chaining; the chain is
//! flattened into a message when it crosses into a `FeeError`.

use thiserror::Error;

/// Errors raised while loading spreadsheets or computing the fee report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("file name '{file_name}' has no date in the 'PL Total - DD.MM' format, skipping file")]
    MissingDateTag { file_name: String },

    #[error("invalid date '{tag}' in file name '{file_name}', use the 'PL Total - DD.MM' format; skipping file")]
    InvalidDateTag { file_name: String, tag: String },

    #[error("failed to load control spreadsheet: {0}")]
    ReferenceLoad(String),

    #[error("failed to load PL file '{file_name}': {reason}")]
    SnapshotLoad { file_name: String, reason: String },

    #[error("control spreadsheet or PL files not loaded: {0}")]
    InsufficientInput(String),

    #[error("failed to serialize report: {0}")]
    Serialization(String),
}

impl FeeError {
    /// Per-file errors skip the offending file but never abort the session
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            FeeError::MissingDateTag { .. }
                | FeeError::InvalidDateTag { .. }
                | FeeError::ReferenceLoad(_)
                | FeeError::SnapshotLoad { .. }
        )
    }
}

/// Result type alias for internal helpers
pub type Result<T> = anyhow::Result<T>;
