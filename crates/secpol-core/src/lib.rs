//! secpol Core
//!
//! Ties the policy document, branch resolver, mutation service and approval
//! projector to a concrete project:
//! - Loads the project context from TOML
//! - Answers policy configuration queries (active policies, scan actions,
//!   schedules, approval rules)
//! - Provides a single error type over every library crate
//!
//! # Example
//!
//! ```rust,ignore
//! use secpol_core::prelude::*;
//!
//! let context = ProjectContext::load("project.toml")?;
//! let document = PolicyDocument::from_yaml(&yaml)?;
//! let config = PolicyConfiguration::new(&document, &context);
//!
//! for rule in config.approval_rules() {
//!     println!("{} -> {:?}", rule.name, rule.protected_branch_ids);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod configuration;
pub mod error;

pub use config::{Limits, ProjectContext};
pub use configuration::{PolicyConfiguration, RuleSchedule};
pub use error::{Result, SecpolError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with secpol
    pub use crate::{Limits, PolicyConfiguration, ProjectContext, RuleSchedule, SecpolError};
    pub use secpol_approval::{ApprovalProjector, ApprovalRuleParams, ProtectedBranchRef};
    pub use secpol_branch::{match_branches, BranchResolver, ProjectBranches, ResolverOptions};
    pub use secpol_document::{PolicyDocument, PolicyEntry, PolicyRule, PolicyType};
    pub use secpol_mutation::{
        MutationError, MutationRequest, Operation, PolicyMutationService, SchemaValidator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
