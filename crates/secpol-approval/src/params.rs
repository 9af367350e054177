//! Approval rule parameters

use secpol_document::{RoleApprover, ScanType, Severity, VulnerabilityState};
use serde::{Deserialize, Serialize};

/// Flat parameter set for one approval rule, derived from one scan-finding rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRuleParams {
    /// Policy name, suffixed with the rule's position after the first
    pub name: String,
    pub policy_name: String,
    /// Position of the policy among active scan-result policies
    pub orchestration_policy_idx: usize,
    /// Position of the rule within the policy's `rules`
    pub rule_idx: usize,
    pub approvals_required: u32,
    pub protected_branch_ids: Vec<u64>,
    pub applies_to_all_protected_branches: bool,
    pub scanners: Vec<ScanType>,
    pub severity_levels: Vec<Severity>,
    pub vulnerability_states: Vec<VulnerabilityState>,
    pub vulnerabilities_allowed: u32,
    pub user_ids: Vec<u64>,
    pub group_ids: Vec<u64>,
    pub role_approvers: Vec<RoleApprover>,
}
