//! Policy configuration queries
//!
//! A [`PolicyConfiguration`] pairs a policy document with the project it is
//! evaluated for and answers the questions the rest of the platform asks:
//! which policies are active, which scans a pipeline must run, which
//! schedules exist and which approval rules must be synchronised.

use crate::config::ProjectContext;
use secpol_approval::{ApprovalProjector, ApprovalRuleParams};
use secpol_branch::{BranchResolver, ProjectBranches};
use secpol_document::{PolicyDocument, PolicyEntry, PolicyRule, PolicyType, ScanAction, ScanType};
use serde::Serialize;
use std::collections::BTreeSet;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// A schedule rule of an active scan-execution policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSchedule {
    /// Position among active scan-execution policies
    pub policy_index: usize,
    /// Position within the policy's rules
    pub rule_index: usize,
    /// Cron expression
    pub cadence: String,
    pub branches: BTreeSet<String>,
}

/// Policy document evaluated for one project
#[derive(Debug, Clone)]
pub struct PolicyConfiguration<'a> {
    document: &'a PolicyDocument,
    context: &'a ProjectContext,
    branches: ProjectBranches,
}

impl<'a> PolicyConfiguration<'a> {
    /// Create configuration
    #[must_use]
    pub fn new(document: &'a PolicyDocument, context: &'a ProjectContext) -> Self {
        Self {
            document,
            context,
            branches: context.project_branches(),
        }
    }

    /// Policy document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &'a PolicyDocument {
        self.document
    }

    /// Project context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &'a ProjectContext {
        self.context
    }

    /// Branch resolver for the project
    #[must_use]
    pub fn resolver(&self) -> BranchResolver<'_> {
        BranchResolver::new(&self.branches, self.context.resolver_options())
    }

    /// Branches the named policy applies to, `None` if there is no such policy
    #[must_use]
    pub fn policy_branches(&self, policy_type: PolicyType, name: &str) -> Option<BTreeSet<String>> {
        let entry = self.document.find(policy_type, name)?;
        Some(self.resolver().resolve(&entry.rules, policy_type))
    }

    /// Enabled scan-execution policies, in document order
    #[must_use]
    pub fn active_scan_execution_policies(&self) -> Vec<&'a PolicyEntry> {
        self.document
            .policies(PolicyType::ScanExecutionPolicy)
            .iter()
            .filter(|entry| entry.enabled)
            .collect()
    }

    /// Enabled scan-result policies that take effect
    ///
    /// Only the first `limits.active_scan_result_policies` count; none do
    /// when scan-result policies are switched off for the project.
    #[must_use]
    pub fn active_scan_result_policies(&self) -> Vec<&'a PolicyEntry> {
        if !self.context.scan_result_policies_enabled {
            return Vec::new();
        }

        self.document
            .policies(PolicyType::ScanResultPolicy)
            .iter()
            .filter(|entry| entry.enabled)
            .take(self.context.limits.active_scan_result_policies)
            .collect()
    }

    /// Non-DAST scan actions a pipeline on `git_ref` must run
    #[must_use]
    pub fn pipeline_scan_actions(&self, git_ref: &str) -> Vec<&'a ScanAction> {
        self.scan_actions_for_ref(git_ref)
            .into_iter()
            .filter(|action| !action.scan.is_on_demand())
            .collect()
    }

    /// DAST actions a pipeline on `git_ref` must run on demand
    #[must_use]
    pub fn on_demand_scan_actions(&self, git_ref: &str) -> Vec<&'a ScanAction> {
        self.scan_actions_for_ref(git_ref)
            .into_iter()
            .filter(|action| action.scan.is_on_demand())
            .collect()
    }

    /// Names of active policies running DAST with `site_profile`
    #[must_use]
    pub fn active_policy_names_with_dast_site_profile(&self, site_profile: &str) -> Vec<&'a str> {
        self.active_policy_names_with_dast(|action| action.site_profile.as_deref() == Some(site_profile))
    }

    /// Names of active policies running DAST with `scanner_profile`
    #[must_use]
    pub fn active_policy_names_with_dast_scanner_profile(&self, scanner_profile: &str) -> Vec<&'a str> {
        self.active_policy_names_with_dast(|action| action.scanner_profile.as_deref() == Some(scanner_profile))
    }

    /// Schedule rules of active scan-execution policies with their branches
    #[must_use]
    pub fn schedule_rules(&self) -> Vec<RuleSchedule> {
        let resolver = self.resolver();
        self.active_scan_execution_policies()
            .into_iter()
            .enumerate()
            .flat_map(|(policy_index, entry)| {
                entry.rules.iter().enumerate().filter_map(move |(rule_index, rule)| match rule {
                    PolicyRule::Schedule(schedule) => Some((policy_index, rule_index, rule, schedule)),
                    PolicyRule::Pipeline(_) | PolicyRule::ScanFinding(_) | PolicyRule::LicenseFinding(_) => None,
                })
            })
            .map(|(policy_index, rule_index, rule, schedule)| RuleSchedule {
                policy_index,
                rule_index,
                cadence: schedule.cadence.clone(),
                branches: resolver.scan_execution_branches(std::slice::from_ref(rule)),
            })
            .collect()
    }

    /// Approval rules of every active scan-result policy
    ///
    /// `orchestration_policy_idx` is the position among active policies.
    #[must_use]
    pub fn approval_rules(&self) -> Vec<ApprovalRuleParams> {
        let lookup = self.context.approvers();
        let projector = ApprovalProjector::new(self.resolver(), &self.context.protected_branches, &lookup)
            .with_limits(self.context.limits.projection());

        let rules: Vec<_> = self
            .active_scan_result_policies()
            .into_iter()
            .enumerate()
            .flat_map(|(policy_idx, entry)| projector.project(policy_idx, entry))
            .collect();

        tracing::debug!(rules = rules.len(), "projected approval rules for project");
        rules
    }

    /// Distinct scanners referenced by approval rules
    #[must_use]
    pub fn uniq_scanners(&self) -> BTreeSet<ScanType> {
        self.approval_rules()
            .into_iter()
            .flat_map(|rule| rule.scanners)
            .collect()
    }

    fn active_policy_names_with_dast(&self, predicate: impl Fn(&ScanAction) -> bool) -> Vec<&'a str> {
        self.active_scan_execution_policies()
            .into_iter()
            .filter(|entry| {
                entry
                    .scan_actions()
                    .any(|action| action.scan == ScanType::Dast && predicate(action))
            })
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Scan actions of active policies with a pipeline rule covering the branch of `git_ref`
    ///
    /// The branch a pipeline runs on exists even if the branch list given
    /// in the context is stale, so it is always considered.
    fn scan_actions_for_ref(&self, git_ref: &str) -> Vec<&'a ScanAction> {
        let Some(branch) = git_ref.strip_prefix(BRANCH_REF_PREFIX) else {
            tracing::debug!(git_ref, "not a branch ref, no scan actions apply");
            return Vec::new();
        };

        let mut project = self.branches.clone();
        if !project.branches.iter().any(|existing| existing == branch) {
            project.branches.push(branch.to_string());
        }
        let resolver = BranchResolver::new(&project, self.context.resolver_options());

        self.active_scan_execution_policies()
            .into_iter()
            .filter(|entry| {
                entry.rules.iter().any(|rule| {
                    matches!(rule, PolicyRule::Pipeline(_))
                        && resolver.applies_to_branch(
                            std::slice::from_ref(rule),
                            PolicyType::ScanExecutionPolicy,
                            branch,
                        )
                })
            })
            .flat_map(|entry| entry.scan_actions())
            .collect()
    }
}
