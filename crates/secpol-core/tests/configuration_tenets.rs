//! Functional tests for project-level policy evaluation.
//!
//! These walk the path a policy takes through the system: a document and a
//! project context are loaded from disk, mutated through the validated
//! service and evaluated into scan actions and approval rules.

use pretty_assertions::assert_eq;
use secpol_core::prelude::*;
use secpol_document::{ScanAction, ScanType};
use secpol_test_utils::{scan_result_policy, POLICY_YAML, PROJECT_TOML};
use std::collections::BTreeSet;

fn context() -> ProjectContext {
    ProjectContext::from_toml_str(PROJECT_TOML).unwrap()
}

fn document() -> PolicyDocument {
    PolicyDocument::from_yaml(POLICY_YAML).unwrap()
}

/// Tenet: context files load from disk exactly as from a string.
#[test]
fn context_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.toml");
    std::fs::write(&path, PROJECT_TOML).unwrap();

    assert_eq!(ProjectContext::load(&path).unwrap(), context());
}

/// Tenet: scan-result policies only ever produce rules for protected branches.
///
/// The fixture's `Block Critical` policy lists no branches, so it covers
/// every protected-branch record of the project.
#[test]
fn fixture_approval_rules_cover_protected_branches() {
    let document = document();
    let context = context();
    let config = PolicyConfiguration::new(&document, &context);

    let rules = config.approval_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "Block Critical");
    assert_eq!(rules[0].protected_branch_ids, vec![1, 2, 3]);
    assert_eq!(rules[0].user_ids, vec![10]);
    assert_eq!(rules[0].group_ids, vec![20]);
    assert_eq!(
        config.uniq_scanners(),
        BTreeSet::from([ScanType::ContainerScanning])
    );
}

/// Tenet: a pipeline on a covered branch gets the policy's DAST action, a
/// pipeline on a tag gets nothing.
#[test]
fn fixture_scan_actions_follow_branch() {
    let document = document();
    let context = context();
    let config = PolicyConfiguration::new(&document, &context);

    assert_eq!(
        config.on_demand_scan_actions("refs/heads/production"),
        vec![&ScanAction::dast("Site Profile", "Scanner Profile")]
    );
    assert!(config.pipeline_scan_actions("refs/heads/production").is_empty());
    assert!(config.on_demand_scan_actions("refs/heads/main").is_empty());
    assert!(config.on_demand_scan_actions("refs/tags/v1.0.0").is_empty());
}

/// Tenet: disabled policies neither run scans nor schedule them.
#[test]
fn disabled_schedule_is_ignored() {
    let document = document();
    let context = context();
    let config = PolicyConfiguration::new(&document, &context);

    assert_eq!(config.active_scan_execution_policies().len(), 1);
    assert!(config.schedule_rules().is_empty());
}

/// Tenet: a full append cycle surfaces through a single error type.
#[test]
fn mutate_then_evaluate() -> Result<(), SecpolError> {
    let context = context();
    let original = document();
    let service = PolicyMutationService::new(SchemaValidator::new()?);

    let entry = scan_result_policy("Block Critical").with_description("duplicate");
    let err: SecpolError = service
        .mutate(&original, &MutationRequest::append(PolicyType::ScanResultPolicy, entry))
        .unwrap_err()
        .into();
    assert!(matches!(&err, SecpolError::Mutation(e) if e.is_duplicate_name()));

    let updated = service.mutate(
        &original,
        &MutationRequest::append(PolicyType::ScanResultPolicy, scan_result_policy("Second gate")),
    )?;
    let config = PolicyConfiguration::new(&updated, &context);
    let names: Vec<_> = config.approval_rules().into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["Block Critical", "Second gate"]);
    Ok(())
}
