//! Error types for policy mutations

use secpol_document::{DocumentError, PolicyType};
use std::fmt::{self, Display, Formatter};

/// One schema violation in a candidate document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    /// JSON pointer of the offending value, e.g. `/scan_result_policy/0/name`
    pub pointer: String,
    /// Human-readable violation
    pub message: String,
}

impl ValidationDetail {
    /// Create detail
    #[inline]
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

impl Display for ValidationDetail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "property '{}' {}", self.pointer, self.message)
    }
}

/// Errors returned by [`PolicyMutationService`](crate::PolicyMutationService)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// Explicit name disagrees with the entry on a non-replace operation
    #[error("Name should be same as the policy name (expected '{expected}', got '{actual}')")]
    ArgumentMismatch { expected: String, actual: String },

    /// Store operation rejected
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Resulting document failed validation; nothing was applied
    #[error("Invalid policy YAML ({policy_type}): {}", join_details(details))]
    Validation {
        policy_type: PolicyType,
        details: Vec<ValidationDetail>,
    },

    /// Validator schema could not be loaded
    #[error("invalid policy schema: {0}")]
    InvalidSchema(String),
}

impl MutationError {
    /// Create argument mismatch error
    pub fn argument_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Check if the mutation collided with an existing policy name
    #[inline]
    #[must_use]
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::Document(DocumentError::DuplicateName { .. }))
    }

    /// Check if the mutation targeted a missing policy
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Document(DocumentError::NotFound { .. }))
    }

    /// Validation details, empty for other errors
    #[must_use]
    pub fn details(&self) -> &[ValidationDetail] {
        match self {
            Self::Validation { details, .. } => details,
            _ => &[],
        }
    }
}

fn join_details(details: &[ValidationDetail]) -> String {
    details
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
