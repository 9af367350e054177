//! Policy document and its store operations
//!
//! A document is loaded whole, mutated by exactly one operation and written
//! back whole. Entry order within a type is the orchestration policy index
//! and is preserved by every operation.

use crate::error::DocumentError;
use crate::policy::{PolicyEntry, PolicyType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of policy type to policy entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDocument {
    policies: IndexMap<PolicyType, Vec<PolicyEntry>>,
}

impl PolicyDocument {
    /// Create empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML policy document
    ///
    /// Blank input and an explicit YAML null both yield an empty document.
    ///
    /// # Errors
    /// Returns [`DocumentError::InvalidYaml`] for malformed YAML or content
    /// that does not fit the policy model.
    pub fn from_yaml(content: &str) -> Result<Self, DocumentError> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| DocumentError::InvalidYaml(e.to_string()))?;
        if value.is_null() {
            return Ok(Self::new());
        }

        serde_yaml::from_value(value).map_err(|e| DocumentError::InvalidYaml(e.to_string()))
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// Returns [`DocumentError::Serialize`] if serialization fails
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(self).map_err(|e| DocumentError::Serialize(e.to_string()))
    }

    /// JSON view of the document, as consumed by schema validation
    ///
    /// # Errors
    /// Returns [`DocumentError::Serialize`] if serialization fails
    pub fn to_json_value(&self) -> Result<serde_json::Value, DocumentError> {
        serde_json::to_value(self).map_err(|e| DocumentError::Serialize(e.to_string()))
    }

    /// Entries of `policy_type`, in order (empty if the type is absent)
    #[must_use]
    pub fn policies(&self, policy_type: PolicyType) -> &[PolicyEntry] {
        self.policies
            .get(&policy_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Position of the entry named `name` within its type
    #[must_use]
    pub fn position(&self, policy_type: PolicyType, name: &str) -> Option<usize> {
        self.policies(policy_type)
            .iter()
            .position(|entry| entry.name == name)
    }

    /// Entry named `name`
    #[must_use]
    pub fn find(&self, policy_type: PolicyType, name: &str) -> Option<&PolicyEntry> {
        self.policies(policy_type)
            .iter()
            .find(|entry| entry.name == name)
    }

    /// Iterate over present types and their entries, in document order
    pub fn iter(&self) -> impl Iterator<Item = (PolicyType, &[PolicyEntry])> {
        self.policies
            .iter()
            .map(|(policy_type, entries)| (*policy_type, entries.as_slice()))
    }

    /// Total number of entries across all types
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.values().map(Vec::len).sum()
    }

    /// Whether the document holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every type's entries carry distinct names
    #[must_use]
    pub fn has_unique_names(&self) -> bool {
        self.policies.values().all(|entries| {
            entries
                .iter()
                .enumerate()
                .all(|(i, entry)| entries[..i].iter().all(|other| other.name != entry.name))
        })
    }

    /// Append `entry` to the end of `policy_type`
    ///
    /// # Errors
    /// [`DocumentError::DuplicateName`] if an entry with the same name exists
    pub fn append(&mut self, policy_type: PolicyType, entry: PolicyEntry) -> Result<(), DocumentError> {
        if self.position(policy_type, &entry.name).is_some() {
            return Err(DocumentError::duplicate_name(policy_type, entry.name));
        }

        tracing::debug!(%policy_type, name = %entry.name, "appending policy");
        self.policies.entry(policy_type).or_default().push(entry);
        Ok(())
    }

    /// Overwrite the entry named `target_name` (or `entry.name`) in place
    ///
    /// Supplying a `target_name` different from `entry.name` renames the entry.
    ///
    /// # Errors
    /// - [`DocumentError::NotFound`] if the target does not exist
    /// - [`DocumentError::DuplicateName`] if a rename collides with another entry
    pub fn replace(
        &mut self,
        policy_type: PolicyType,
        target_name: Option<&str>,
        entry: PolicyEntry,
    ) -> Result<(), DocumentError> {
        let target = target_name.unwrap_or(&entry.name);
        let index = self
            .position(policy_type, target)
            .ok_or_else(|| DocumentError::not_found(policy_type, target))?;

        let collides = self
            .policies(policy_type)
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && other.name == entry.name);
        if collides {
            return Err(DocumentError::duplicate_name(policy_type, entry.name.clone()));
        }

        tracing::debug!(%policy_type, target, name = %entry.name, index, "replacing policy");
        if let Some(entries) = self.policies.get_mut(&policy_type) {
            entries[index] = entry;
        }
        Ok(())
    }

    /// Remove the entry named `name`
    ///
    /// # Errors
    /// [`DocumentError::NotFound`] if no such entry exists
    pub fn remove(&mut self, policy_type: PolicyType, name: &str) -> Result<PolicyEntry, DocumentError> {
        let index = self
            .position(policy_type, name)
            .ok_or_else(|| DocumentError::not_found(policy_type, name))?;

        tracing::debug!(%policy_type, name, index, "removing policy");
        self.policies
            .get_mut(&policy_type)
            .map(|entries| entries.remove(index))
            .ok_or_else(|| DocumentError::not_found(policy_type, name))
    }
}
