//! Error types for policy document operations

use crate::policy::PolicyType;

/// Errors raised by the policy document store and its YAML boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Append or rename collides with an existing entry of the same type
    #[error("Policy already exists with same name: '{name}' ({policy_type})")]
    DuplicateName { policy_type: PolicyType, name: String },

    /// Replace or remove target is absent
    #[error("Policy does not exist: '{name}' ({policy_type})")]
    NotFound { policy_type: PolicyType, name: String },

    /// Input is not a well-formed policy document
    #[error("invalid policy YAML: {0}")]
    InvalidYaml(String),

    /// Document could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(String),
}

impl DocumentError {
    /// Create duplicate name error
    pub fn duplicate_name(policy_type: PolicyType, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            policy_type,
            name: name.into(),
        }
    }

    /// Create not found error
    pub fn not_found(policy_type: PolicyType, name: impl Into<String>) -> Self {
        Self::NotFound {
            policy_type,
            name: name.into(),
        }
    }
}
