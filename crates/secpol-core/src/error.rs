//! Error types for secpol
//!
//! [`SecpolError`] wraps the errors of every library crate so callers that
//! drive a whole load, mutate and project cycle can use a single `?`.

use secpol_document::DocumentError;
use secpol_mutation::MutationError;
use std::path::PathBuf;

/// Main secpol error type
#[derive(Debug, thiserror::Error)]
pub enum SecpolError {
    /// Policy document error
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Mutation rejected
    #[error("mutation failed: {0}")]
    Mutation(#[from] MutationError),

    /// Project context is malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// File could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SecpolError {
    /// Create I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Validation details when a mutation failed validation
    #[must_use]
    pub fn validation_details(&self) -> &[secpol_mutation::ValidationDetail] {
        match self {
            Self::Mutation(error) => error.details(),
            _ => &[],
        }
    }
}

/// Result alias using [`SecpolError`]
pub type Result<T, E = SecpolError> = std::result::Result<T, E>;
