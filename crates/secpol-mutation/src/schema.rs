//! JSON-schema backed validator
//!
//! The policy schema ships with the crate. Documents are converted to JSON
//! and every violation is reported as a [`ValidationDetail`] carrying the
//! JSON pointer of the offending value.

use crate::error::{MutationError, ValidationDetail};
use crate::validator::PolicyValidator;
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use secpol_document::{PolicyDocument, PolicyType};
use serde_json::Value;
use std::fmt;

const POLICY_SCHEMA_SOURCE: &str = include_str!("../schema/security_orchestration_policy.json");

static POLICY_SCHEMA: Lazy<Result<Value, String>> =
    Lazy::new(|| serde_json::from_str(POLICY_SCHEMA_SOURCE).map_err(|e| e.to_string()));

/// Validator over the security orchestration policy schema
pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Validator over the embedded policy schema
    ///
    /// # Errors
    /// Returns [`MutationError::InvalidSchema`] if the embedded schema does
    /// not parse or compile.
    pub fn new() -> Result<Self, MutationError> {
        let schema = POLICY_SCHEMA
            .as_ref()
            .map_err(|e| MutationError::InvalidSchema(e.clone()))?;
        Self::from_schema(schema)
    }

    /// Validator over a caller-supplied draft-07 schema
    ///
    /// # Errors
    /// Returns [`MutationError::InvalidSchema`] if `schema` does not compile.
    pub fn from_schema(schema: &Value) -> Result<Self, MutationError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| MutationError::InvalidSchema(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Violations of `instance`, in schema evaluation order
    #[must_use]
    pub fn violations(&self, instance: &Value) -> Vec<ValidationDetail> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| ValidationDetail::new(error.instance_path.to_string(), error.to_string()))
                .collect(),
        }
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl PolicyValidator for SchemaValidator {
    fn validate(&self, policy_type: PolicyType, document: &PolicyDocument) -> Result<(), Vec<ValidationDetail>> {
        let instance = document
            .to_json_value()
            .map_err(|e| vec![ValidationDetail::new("", e.to_string())])?;

        let details = self.violations(&instance);
        if details.is_empty() {
            Ok(())
        } else {
            tracing::debug!(%policy_type, violations = details.len(), "policy document failed schema validation");
            Err(details)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secpol_document::{
        ApprovalAction, BranchScope, PolicyAction, PolicyEntry, PolicyRule, ScanAction, ScanType,
    };

    fn validator() -> SchemaValidator {
        SchemaValidator::new().unwrap()
    }

    fn pointers(details: &[ValidationDetail]) -> Vec<&str> {
        details.iter().map(|d| d.pointer.as_str()).collect()
    }

    fn scan_execution(action: ScanAction) -> PolicyEntry {
        PolicyEntry::new("Run scans")
            .with_rule(PolicyRule::pipeline(BranchScope::branches(["main"])))
            .with_action(PolicyAction::Scan(action))
    }

    fn scan_result(approval: ApprovalAction) -> PolicyEntry {
        PolicyEntry::new("Block Critical")
            .with_rule(PolicyRule::scan_finding(BranchScope::branches(["main"])))
            .with_action(PolicyAction::RequireApproval(approval))
    }

    fn document(policy_type: PolicyType, entries: Vec<PolicyEntry>) -> PolicyDocument {
        let mut document = PolicyDocument::new();
        for entry in entries {
            document.append(policy_type, entry).unwrap();
        }
        document
    }

    #[test]
    fn embedded_schema_compiles() {
        assert!(SchemaValidator::new().is_ok());
    }

    #[test]
    fn empty_document_is_valid() {
        assert!(validator()
            .validate(PolicyType::ScanExecutionPolicy, &PolicyDocument::new())
            .is_ok());
    }

    #[test]
    fn well_formed_policies_are_valid() {
        let mut doc = document(
            PolicyType::ScanExecutionPolicy,
            vec![scan_execution(ScanAction::dast("Site", "Scanner"))],
        );
        doc.append(
            PolicyType::ScanResultPolicy,
            scan_result(ApprovalAction::new(2).with_user_approvers(["alice"])),
        )
        .unwrap();

        assert_eq!(validator().validate(PolicyType::ScanResultPolicy, &doc), Ok(()));
    }

    #[test]
    fn dast_requires_profiles() {
        let doc = document(
            PolicyType::ScanExecutionPolicy,
            vec![scan_execution(ScanAction::new(ScanType::Dast))],
        );

        let details = validator()
            .validate(PolicyType::ScanExecutionPolicy, &doc)
            .unwrap_err();
        assert!(pointers(&details).contains(&"/scan_execution_policy/0/actions/0"));
    }

    #[test]
    fn non_dast_scans_reject_profiles() {
        let mut action = ScanAction::new(ScanType::SecretDetection);
        action.site_profile = Some("Site".to_string());
        let doc = document(PolicyType::ScanExecutionPolicy, vec![scan_execution(action)]);

        assert!(validator()
            .validate(PolicyType::ScanExecutionPolicy, &doc)
            .is_err());
    }

    #[test]
    fn fuzzing_is_not_an_executable_scan() {
        let doc = document(
            PolicyType::ScanExecutionPolicy,
            vec![scan_execution(ScanAction::new(ScanType::CoverageFuzzing))],
        );

        let details = validator()
            .validate(PolicyType::ScanExecutionPolicy, &doc)
            .unwrap_err();
        assert!(pointers(&details).contains(&"/scan_execution_policy/0/actions/0/scan"));
    }

    #[test]
    fn approvals_required_is_bounded() {
        let doc = document(PolicyType::ScanResultPolicy, vec![scan_result(ApprovalAction::new(101))]);

        let details = validator()
            .validate(PolicyType::ScanResultPolicy, &doc)
            .unwrap_err();
        assert_eq!(
            pointers(&details),
            vec!["/scan_result_policy/0/actions/0/approvals_required"]
        );
        assert!(details[0]
            .to_string()
            .starts_with("property '/scan_result_policy/0/actions/0/approvals_required'"));
    }

    #[test]
    fn entries_need_rules_and_actions() {
        let doc = document(PolicyType::ScanResultPolicy, vec![PolicyEntry::new("Empty")]);

        let details = validator()
            .validate(PolicyType::ScanResultPolicy, &doc)
            .unwrap_err();
        let pointers = pointers(&details);
        assert!(pointers.contains(&"/scan_result_policy/0/rules"));
        assert!(pointers.contains(&"/scan_result_policy/0/actions"));
    }

    #[test]
    fn policy_count_is_capped_per_type() {
        let entries = (0..6)
            .map(|i| {
                let mut entry = scan_result(ApprovalAction::new(1));
                entry.name = format!("Policy {i}");
                entry
            })
            .collect();
        let doc = document(PolicyType::ScanResultPolicy, entries);

        let details = validator()
            .validate(PolicyType::ScanResultPolicy, &doc)
            .unwrap_err();
        assert_eq!(pointers(&details), vec!["/scan_result_policy"]);
    }

    #[test]
    fn custom_schema_is_honoured() {
        let schema = serde_json::json!({ "type": "object", "maxProperties": 0 });
        let validator = SchemaValidator::from_schema(&schema).unwrap();
        let doc = document(PolicyType::ScanResultPolicy, vec![PolicyEntry::new("Any")]);

        assert!(validator.validate(PolicyType::ScanResultPolicy, &doc).is_err());
    }
}
