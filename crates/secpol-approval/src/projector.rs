//! Scan-result policy projection
//!
//! Each of the first `rules_per_policy` scan-finding rules of a policy with a
//! `require_approval` action becomes one [`ApprovalRuleParams`]. Rules of
//! other kinds are skipped and do not count against the limit.

use crate::limits::ProjectionLimits;
use crate::lookup::ApproverLookup;
use crate::params::ApprovalRuleParams;
use secpol_branch::{BranchPattern, BranchResolver};
use secpol_document::{ApprovalAction, PolicyEntry, PolicyRule, PolicyType, RoleApprover};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Protected-branch record of the project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtectedBranchRef {
    pub id: u64,
    /// Branch name or pattern
    pub name: String,
}

impl ProtectedBranchRef {
    /// Create record
    #[inline]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Approvers {
    user_ids: Vec<u64>,
    group_ids: Vec<u64>,
    roles: Vec<RoleApprover>,
}

/// Projects scan-result policies into approval rule parameters
#[derive(Debug)]
pub struct ApprovalProjector<'a, L> {
    resolver: BranchResolver<'a>,
    protected: Vec<(u64, BranchPattern)>,
    lookup: &'a L,
    limits: ProjectionLimits,
}

impl<'a, L: ApproverLookup> ApprovalProjector<'a, L> {
    /// Create projector with default limits
    #[must_use]
    pub fn new(resolver: BranchResolver<'a>, protected: &[ProtectedBranchRef], lookup: &'a L) -> Self {
        Self {
            resolver,
            protected: protected
                .iter()
                .map(|branch| (branch.id, BranchPattern::new(branch.name.as_str())))
                .collect(),
            lookup,
            limits: ProjectionLimits::default(),
        }
    }

    /// With limits
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: ProjectionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Approval rules for `entry` at position `policy_idx`
    ///
    /// Empty when the policy has no `require_approval` action. Only the first
    /// such action is used.
    #[must_use]
    pub fn project(&self, policy_idx: usize, entry: &PolicyEntry) -> Vec<ApprovalRuleParams> {
        let Some(action) = entry.approval_action() else {
            return Vec::new();
        };
        let approvers = self.approvers(action);

        let params: Vec<_> = entry
            .rules
            .iter()
            .enumerate()
            .filter_map(|(rule_idx, rule)| match rule {
                PolicyRule::ScanFinding(finding) => Some((rule_idx, rule, finding)),
                PolicyRule::Pipeline(_) | PolicyRule::Schedule(_) | PolicyRule::LicenseFinding(_) => None,
            })
            .take(self.limits.rules_per_policy)
            .enumerate()
            .map(|(position, (rule_idx, rule, finding))| ApprovalRuleParams {
                name: rule_name(&entry.name, position),
                policy_name: entry.name.clone(),
                orchestration_policy_idx: policy_idx,
                rule_idx,
                approvals_required: action.approvals_required,
                protected_branch_ids: self.protected_branch_ids(rule),
                applies_to_all_protected_branches: finding.scope.has_empty_branch_list(),
                scanners: finding.scanners.clone(),
                severity_levels: finding.severity_levels.clone(),
                vulnerability_states: finding.vulnerability_states.clone(),
                vulnerabilities_allowed: finding.vulnerabilities_allowed,
                user_ids: approvers.user_ids.clone(),
                group_ids: approvers.group_ids.clone(),
                role_approvers: approvers.roles.clone(),
            })
            .collect();

        tracing::debug!(
            policy = %entry.name,
            policy_idx,
            rules = params.len(),
            "projected approval rules"
        );
        params
    }

    /// Ids of protected-branch records covering a branch the rule resolves to
    fn protected_branch_ids(&self, rule: &PolicyRule) -> Vec<u64> {
        let branches = self
            .resolver
            .resolve(std::slice::from_ref(rule), PolicyType::ScanResultPolicy);

        self.protected
            .iter()
            .filter(|(_, pattern)| branches.iter().any(|branch| pattern.matches(branch)))
            .map(|(id, _)| *id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn approvers(&self, action: &ApprovalAction) -> Approvers {
        let limit = self.limits.approvers;
        Approvers {
            user_ids: capped(
                &action.user_approvers,
                &action.user_approvers_ids,
                limit,
                |names| self.lookup.user_ids(names),
            ),
            group_ids: capped(
                &action.group_approvers,
                &action.group_approvers_ids,
                limit,
                |names| self.lookup.group_ids(names),
            ),
            roles: action.role_approvers.iter().copied().take(limit).collect(),
        }
    }
}

/// `name`, then `name 2`, `name 3`, ...
fn rule_name(policy_name: &str, position: usize) -> String {
    if position == 0 {
        policy_name.to_string()
    } else {
        format!("{policy_name} {}", position + 1)
    }
}

/// Names first up to `limit`, then ids fill the remaining budget
fn capped(names: &[String], ids: &[u64], limit: usize, resolve: impl FnOnce(&[String]) -> Vec<u64>) -> Vec<u64> {
    let names = &names[..names.len().min(limit)];
    let remaining = limit - names.len();

    let mut seen = BTreeSet::new();
    resolve(names)
        .into_iter()
        .chain(ids.iter().copied().take(remaining))
        .filter(|id| seen.insert(*id))
        .collect()
}
