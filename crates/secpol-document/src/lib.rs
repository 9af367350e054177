//! secpol Policy Documents
//!
//! Typed representation of a security orchestration policy document and the
//! store operations that mutate it.
//!
//! # Core Concepts
//!
//! - [`PolicyDocument`]: Ordered mapping of [`PolicyType`] to policy entries
//! - [`PolicyEntry`]: A named policy with rules and actions
//! - [`PolicyRule`]: Closed set of rule kinds (`pipeline`, `schedule`, `scan_finding`, `license_finding`)
//! - [`PolicyAction`]: Closed set of action kinds (`scan`, `require_approval`)
//! - [`BranchScope`]: Branch targeting shared by every rule kind
//!
//! # Example
//!
//! ```rust,ignore
//! use secpol_document::{PolicyDocument, PolicyType};
//!
//! let mut document = PolicyDocument::from_yaml(yaml)?;
//! document.append(PolicyType::ScanResultPolicy, entry)?;
//! let yaml = document.to_yaml()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod action;
mod document;
mod error;
mod policy;
mod rule;

pub use action::{
    ApprovalAction, ApprovalActionKind, PolicyAction, RoleApprover, ScanAction, ScanType,
};
pub use document::PolicyDocument;
pub use error::DocumentError;
pub use policy::{PolicyEntry, PolicyType};
pub use rule::{
    BranchException, BranchScope, BranchTarget, BranchType, LicenseFindingRule, LicenseState,
    PipelineRule, PolicyRule, RuleKind, ScanFindingRule, ScheduleRule, Severity,
    VulnerabilityState,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
