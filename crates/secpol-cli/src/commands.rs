//! Subcommand implementations
//!
//! Each command reads its inputs from disk and writes its result to `out`,
//! so the binary and the tests share one code path.

use anyhow::{bail, Context, Result};
use secpol_core::{PolicyConfiguration, ProjectContext};
use secpol_document::{DocumentError, PolicyDocument, PolicyEntry, PolicyType};
use secpol_mutation::{MutationRequest, Operation, PolicyMutationService, SchemaValidator};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Arguments of `secpol mutate`
#[derive(Debug, Clone)]
pub(crate) struct MutateArgs {
    pub(crate) policy: PathBuf,
    pub(crate) operation: Operation,
    pub(crate) policy_type: PolicyType,
    pub(crate) entry: Option<PathBuf>,
    pub(crate) name: Option<String>,
    pub(crate) write: bool,
}

fn read_document(path: &Path) -> Result<PolicyDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file {}", path.display()))?;
    PolicyDocument::from_yaml(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_entry(path: &Path) -> Result<PolicyEntry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read entry file {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("failed to parse entry {}", path.display()))
}

fn read_context(path: &Path) -> Result<ProjectContext> {
    Ok(ProjectContext::load(path)?)
}

/// Schema-validate a policy file; returns whether it is valid
pub(crate) fn validate(policy: &Path, out: &mut dyn Write) -> Result<bool> {
    let document = read_document(policy)?;
    let details = SchemaValidator::new()?.violations(&document.to_json_value()?);

    if details.is_empty() {
        writeln!(out, "{}: valid", policy.display())?;
        return Ok(true);
    }

    for detail in &details {
        writeln!(out, "{detail}")?;
    }
    tracing::warn!(path = %policy.display(), violations = details.len(), "policy file is invalid");
    Ok(false)
}

/// Print the branches a named policy applies to, one per line
pub(crate) fn branches(
    policy: &Path,
    project: &Path,
    policy_type: PolicyType,
    name: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let document = read_document(policy)?;
    let context = read_context(project)?;
    let config = PolicyConfiguration::new(&document, &context);

    let branches = config
        .policy_branches(policy_type, name)
        .ok_or_else(|| DocumentError::not_found(policy_type, name))?;
    for branch in branches {
        writeln!(out, "{branch}")?;
    }
    Ok(())
}

/// Apply one mutation; print the new document or write it back in place
///
/// Removal only needs the policy name, so `--name` alone is enough there.
pub(crate) fn mutate(args: &MutateArgs, out: &mut dyn Write) -> Result<()> {
    let document = read_document(&args.policy)?;
    let entry = match (&args.entry, args.operation, &args.name) {
        (Some(path), _, _) => read_entry(path)?,
        (None, Operation::Remove, Some(name)) => PolicyEntry::new(name.as_str()),
        (None, Operation::Remove, None) => bail!("remove needs --entry or --name"),
        (None, operation, _) => bail!("{operation} needs --entry"),
    };

    let mut request = MutationRequest::new(args.operation, args.policy_type, entry);
    request.name.clone_from(&args.name);

    let service = PolicyMutationService::new(SchemaValidator::new()?);
    let updated = service.mutate(&document, &request)?;
    let yaml = updated.to_yaml()?;

    if args.write {
        std::fs::write(&args.policy, &yaml)
            .with_context(|| format!("failed to write {}", args.policy.display()))?;
        writeln!(out, "{} {} in {}", args.operation, request.entry.name, args.policy.display())?;
    } else {
        out.write_all(yaml.as_bytes())?;
    }
    Ok(())
}

/// Print projected approval rules as JSON
pub(crate) fn approvals(policy: &Path, project: &Path, out: &mut dyn Write) -> Result<()> {
    let document = read_document(policy)?;
    let context = read_context(project)?;
    let rules = PolicyConfiguration::new(&document, &context).approval_rules();

    serde_json::to_writer_pretty(&mut *out, &rules)?;
    writeln!(out)?;
    Ok(())
}

/// Print scan actions applicable to `git_ref` as JSON
pub(crate) fn scan_actions(
    policy: &Path,
    project: &Path,
    git_ref: &str,
    on_demand: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let document = read_document(policy)?;
    let context = read_context(project)?;
    let config = PolicyConfiguration::new(&document, &context);

    let actions = if on_demand {
        config.on_demand_scan_actions(git_ref)
    } else {
        config.pipeline_scan_actions(git_ref)
    };
    serde_json::to_writer_pretty(&mut *out, &actions)?;
    writeln!(out)?;
    Ok(())
}
