//! Testing utilities for secpol workspace
//!
//! Shared policy fixtures and builders.

#![allow(missing_docs)]

use secpol_branch::ProjectBranches;
use secpol_document::{
    ApprovalAction, BranchScope, PolicyAction, PolicyDocument, PolicyEntry, PolicyRule,
    PolicyType, ScanAction, ScanFindingRule, ScanType, Severity, VulnerabilityState,
};

/// Document with two scan-execution and one scan-result policy; schema-valid
pub const POLICY_YAML: &str = r#"
scan_execution_policy:
  - name: Run DAST in every pipeline
    description: This policy enforces to run DAST for every pipeline within the project
    enabled: true
    rules:
      - type: pipeline
        branches:
          - production
    actions:
      - scan: dast
        site_profile: Site Profile
        scanner_profile: Scanner Profile
  - name: Nightly secret detection
    enabled: false
    rules:
      - type: schedule
        cadence: "0 0 * * *"
        branch_type: default
    actions:
      - scan: secret_detection
scan_result_policy:
  - name: Block Critical
    enabled: true
    rules:
      - type: scan_finding
        branches: []
        scanners: [container_scanning]
        vulnerabilities_allowed: 0
        severity_levels: [critical]
        vulnerability_states: [newly_detected]
    actions:
      - type: require_approval
        approvals_required: 1
        user_approvers: [alice]
        group_approvers: [security/reviewers]
"#;

/// Project context matching [`project_branches`]
pub const PROJECT_TOML: &str = r#"
project_path = "group/app"
default_branch = "main"
branches = ["main", "dev", "production", "release/1.0", "feature/login"]
exceptions_enabled = true
scan_result_policies_enabled = true

[[protected_branches]]
id = 1
name = "main"

[[protected_branches]]
id = 2
name = "release/*"

[[protected_branches]]
id = 3
name = "production"

[users]
alice = 10
bob = 11

[groups]
"security/reviewers" = 20
"#;

pub fn policy_document() -> PolicyDocument {
    PolicyDocument::from_yaml(POLICY_YAML).unwrap()
}

pub fn project_branches() -> ProjectBranches {
    ProjectBranches::new(["main", "dev", "production", "release/1.0", "feature/login"])
        .with_protected(["main", "release/*", "production"])
        .with_default_branch("main")
}

/// Schema-valid scan-execution policy running SAST on pipelines of `branches`
pub fn scan_execution_policy<I, S>(name: &str, branches: I) -> PolicyEntry
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    PolicyEntry::new(name)
        .with_rule(PolicyRule::pipeline(BranchScope::branches(branches)))
        .with_action(PolicyAction::Scan(ScanAction::new(ScanType::Sast)))
}

/// Schema-valid scan-execution policy running DAST with the given profiles
pub fn dast_policy<I, S>(name: &str, branches: I, site_profile: &str, scanner_profile: &str) -> PolicyEntry
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    PolicyEntry::new(name)
        .with_rule(PolicyRule::pipeline(BranchScope::branches(branches)))
        .with_action(PolicyAction::Scan(ScanAction::dast(site_profile, scanner_profile)))
}

/// Critical-severity scan-finding rule over `branches`
pub fn critical_finding_rule<I, S>(branches: I) -> PolicyRule
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    PolicyRule::ScanFinding(ScanFindingRule {
        scope: BranchScope::branches(branches),
        scanners: vec![ScanType::ContainerScanning],
        vulnerabilities_allowed: 0,
        severity_levels: vec![Severity::Critical],
        vulnerability_states: vec![VulnerabilityState::NewlyDetected],
    })
}

/// Schema-valid scan-result policy requiring one approval from `alice`
pub fn scan_result_policy(name: &str) -> PolicyEntry {
    PolicyEntry::new(name)
        .with_rule(critical_finding_rule(Vec::<String>::new()))
        .with_action(PolicyAction::RequireApproval(
            ApprovalAction::new(1).with_user_approvers(["alice"]),
        ))
}

/// Document holding `names` under `policy_type`, in order
pub fn document_with(policy_type: PolicyType, names: &[&str]) -> PolicyDocument {
    let mut document = PolicyDocument::new();
    for name in names {
        let entry = match policy_type {
            PolicyType::ScanExecutionPolicy => scan_execution_policy(name, ["main"]),
            PolicyType::ScanResultPolicy => scan_result_policy(name),
        };
        document.append(policy_type, entry).unwrap();
    }
    document
}
