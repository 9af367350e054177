//! Policy mutation service
//!
//! One request, one store operation, one whole-document validation. The
//! input document is only ever borrowed; the mutated copy is returned on
//! success and dropped on failure.

use crate::error::MutationError;
use crate::validator::PolicyValidator;
use secpol_document::{PolicyDocument, PolicyEntry, PolicyType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Store operation requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Append,
    Replace,
    Remove,
}

impl Operation {
    /// All operations
    pub const ALL: [Operation; 3] = [Self::Append, Self::Replace, Self::Remove];

    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation: '{s}'"))
    }
}

/// A single mutation of one policy type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub operation: Operation,
    pub policy_type: PolicyType,

    /// Explicit target name; for `replace` this is the entry being renamed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub entry: PolicyEntry,
}

impl MutationRequest {
    /// Create request without an explicit name
    #[must_use]
    pub fn new(operation: Operation, policy_type: PolicyType, entry: PolicyEntry) -> Self {
        Self {
            operation,
            policy_type,
            name: None,
            entry,
        }
    }

    /// Append `entry` under `policy_type`
    #[inline]
    #[must_use]
    pub fn append(policy_type: PolicyType, entry: PolicyEntry) -> Self {
        Self::new(Operation::Append, policy_type, entry)
    }

    /// Replace the entry named like `entry` in place
    #[inline]
    #[must_use]
    pub fn replace(policy_type: PolicyType, entry: PolicyEntry) -> Self {
        Self::new(Operation::Replace, policy_type, entry)
    }

    /// Remove the entry named like `entry`
    #[inline]
    #[must_use]
    pub fn remove(policy_type: PolicyType, entry: PolicyEntry) -> Self {
        Self::new(Operation::Remove, policy_type, entry)
    }

    /// With explicit target name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn check_name(&self) -> Result<(), MutationError> {
        match (&self.name, self.operation) {
            (Some(name), Operation::Append | Operation::Remove) if *name != self.entry.name => {
                Err(MutationError::argument_mismatch(name, &self.entry.name))
            }
            _ => Ok(()),
        }
    }
}

/// Applies validated mutations to policy documents
#[derive(Debug, Clone, Default)]
pub struct PolicyMutationService<V> {
    validator: V,
}

impl<V: PolicyValidator> PolicyMutationService<V> {
    /// Create service validating with `validator`
    #[inline]
    #[must_use]
    pub fn new(validator: V) -> Self {
        Self { validator }
    }

    /// Validator in use
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Apply `request` to a copy of `document`
    ///
    /// # Errors
    /// - [`MutationError::ArgumentMismatch`] before touching the document
    /// - [`MutationError::Document`] when the store operation is rejected
    /// - [`MutationError::Validation`] when the resulting document is invalid
    ///
    /// `document` is never modified; on error the caller still holds the
    /// original.
    pub fn mutate(
        &self,
        document: &PolicyDocument,
        request: &MutationRequest,
    ) -> Result<PolicyDocument, MutationError> {
        let result = self.apply(document, request);
        match &result {
            Ok(_) => tracing::info!(
                operation = %request.operation,
                policy_type = %request.policy_type,
                policy = %request.entry.name,
                "policy mutation applied"
            ),
            Err(error) => tracing::warn!(
                operation = %request.operation,
                policy_type = %request.policy_type,
                policy = %request.entry.name,
                %error,
                "policy mutation rejected"
            ),
        }
        result
    }

    fn apply(&self, document: &PolicyDocument, request: &MutationRequest) -> Result<PolicyDocument, MutationError> {
        request.check_name()?;

        let policy_type = request.policy_type;
        let mut candidate = document.clone();
        match request.operation {
            Operation::Append => candidate.append(policy_type, request.entry.clone())?,
            Operation::Replace => {
                candidate.replace(policy_type, request.name.as_deref(), request.entry.clone())?;
            }
            Operation::Remove => {
                let target = request.name.as_deref().unwrap_or(&request.entry.name);
                candidate.remove(policy_type, target)?;
            }
        }

        self.validator
            .validate(policy_type, &candidate)
            .map_err(|details| MutationError::Validation { policy_type, details })?;

        Ok(candidate)
    }
}
