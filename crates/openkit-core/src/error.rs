//! Error types for openkit-core

use std::path::PathBuf;

/// Result type for openkit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in openkit-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ledger declares no schema version, or one this build cannot read
    #[error("Unsupported managed state schema_version {found:?} (expected {expected:?})")]
    LedgerSchema {
        found: Option<String>,
        expected: &'static str,
    },

    /// The ledger file is not valid JSON for the managed state layout
    #[error("Failed to parse managed state at {path}: {source}")]
    LedgerParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The plan references a path that is missing from the desired working set
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from openkit-fs (I/O, invalid path, path escape)
    #[error(transparent)]
    Fs(#[from] openkit_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error comes from rejecting a malformed or escaping path.
    pub fn is_path_violation(&self) -> bool {
        matches!(
            self,
            Self::Fs(openkit_fs::Error::InvalidPath { .. } | openkit_fs::Error::PathEscape { .. })
        )
    }
}
