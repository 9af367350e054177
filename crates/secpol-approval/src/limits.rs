//! Platform limits applied during projection

use serde::{Deserialize, Serialize};

/// Enabled scan-result policies considered per configuration
pub const ACTIVE_SCAN_RESULT_POLICIES_LIMIT: usize = 5;

/// Scan-finding rules projected per policy
pub const RULES_PER_POLICY_LIMIT: usize = 5;

/// Approvers of each kind (users, groups, roles) per rule
pub const APPROVERS_LIMIT: usize = 300;

/// Projection limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionLimits {
    pub rules_per_policy: usize,
    pub approvers: usize,
}

impl Default for ProjectionLimits {
    fn default() -> Self {
        Self {
            rules_per_policy: RULES_PER_POLICY_LIMIT,
            approvers: APPROVERS_LIMIT,
        }
    }
}

impl ProjectionLimits {
    /// With rule limit
    #[inline]
    #[must_use]
    pub fn with_rules_per_policy(mut self, limit: usize) -> Self {
        self.rules_per_policy = limit;
        self
    }

    /// With approver limit
    #[inline]
    #[must_use]
    pub fn with_approvers(mut self, limit: usize) -> Self {
        self.approvers = limit;
        self
    }
}
