//! Policy types and entries

use crate::action::{ApprovalAction, PolicyAction, ScanAction};
use crate::rule::PolicyRule;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Top-level key of a policy document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    /// Policies that trigger scans on pipelines or schedules
    ScanExecutionPolicy,
    /// Policies that require approvals based on scan findings
    ScanResultPolicy,
}

impl PolicyType {
    /// All policy types, in document order
    pub const ALL: [PolicyType; 2] = [Self::ScanExecutionPolicy, Self::ScanResultPolicy];

    /// YAML key for this type
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScanExecutionPolicy => "scan_execution_policy",
            Self::ScanResultPolicy => "scan_result_policy",
        }
    }

    /// Scan-result policies only ever apply to protected branches
    #[inline]
    #[must_use]
    pub fn is_scan_result(self) -> bool {
        matches!(self, Self::ScanResultPolicy)
    }
}

impl Display for PolicyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown policy type: '{s}'"))
    }
}

/// A single named policy within a document
///
/// # Invariants
/// - `name` is unique among the entries of its [`PolicyType`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,

    #[serde(default)]
    pub actions: Vec<PolicyAction>,
}

impl PolicyEntry {
    /// Create an enabled entry with no rules or actions
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            rules: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With enabled flag
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// With an additional rule
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// With an additional action
    #[inline]
    #[must_use]
    pub fn with_action(mut self, action: PolicyAction) -> Self {
        self.actions.push(action);
        self
    }

    /// First `require_approval` action, if any
    #[must_use]
    pub fn approval_action(&self) -> Option<&ApprovalAction> {
        self.actions.iter().find_map(|action| match action {
            PolicyAction::RequireApproval(approval) => Some(approval),
            PolicyAction::Scan(_) => None,
        })
    }

    /// All scan actions, in declaration order
    pub fn scan_actions(&self) -> impl Iterator<Item = &ScanAction> {
        self.actions.iter().filter_map(|action| match action {
            PolicyAction::Scan(scan) => Some(scan),
            PolicyAction::RequireApproval(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ScanType;

    #[test]
    fn policy_type_roundtrips_through_str() {
        for policy_type in PolicyType::ALL {
            assert_eq!(policy_type.as_str().parse::<PolicyType>(), Ok(policy_type));
        }
        assert!("network_policy".parse::<PolicyType>().is_err());
    }

    #[test]
    fn scan_result_flag() {
        assert!(PolicyType::ScanResultPolicy.is_scan_result());
        assert!(!PolicyType::ScanExecutionPolicy.is_scan_result());
    }

    #[test]
    fn entry_action_accessors() {
        let entry = PolicyEntry::new("mixed")
            .with_action(PolicyAction::Scan(ScanAction::new(ScanType::Sast)))
            .with_action(PolicyAction::RequireApproval(ApprovalAction::new(2)));

        assert_eq!(entry.scan_actions().count(), 1);
        assert_eq!(entry.approval_action().map(|a| a.approvals_required), Some(2));
    }

    #[test]
    fn entry_without_approval_action() {
        let entry = PolicyEntry::new("scan only")
            .with_action(PolicyAction::Scan(ScanAction::new(ScanType::Dast)));
        assert!(entry.approval_action().is_none());
    }
}
