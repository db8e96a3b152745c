//! Error types for openkit-fs

use std::path::PathBuf;

/// Result type for openkit-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in openkit-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A relative output path is malformed (empty, absolute, or contains `..`)
    #[error("Invalid output path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A resolved path does not stay inside the project root
    #[error("Refusing to touch {path:?} outside project root {root}")]
    PathEscape { path: String, root: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }
}
