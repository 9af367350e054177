//! secpol Approval Projection
//!
//! Turns scan-result policies into flat approval rule parameter sets that a
//! merge-request approval engine can persist.
//!
//! # Core Concepts
//!
//! - [`ApprovalProjector`]: Policy entry -> `[ApprovalRuleParams]`
//! - [`ApprovalRuleParams`]: One approval rule per scan-finding rule
//! - [`ApproverLookup`]: Name -> id resolution for users and groups
//! - [`ProjectionLimits`]: Rule and approver caps

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod limits;
mod lookup;
mod params;
mod projector;

pub use limits::{
    ProjectionLimits, ACTIVE_SCAN_RESULT_POLICIES_LIMIT, APPROVERS_LIMIT, RULES_PER_POLICY_LIMIT,
};
pub use lookup::{ApproverLookup, StaticApprovers};
pub use params::ApprovalRuleParams;
pub use projector::{ApprovalProjector, ProtectedBranchRef};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
