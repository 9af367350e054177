//! Project context configuration
//!
//! Everything the branch resolver, approval projector and configuration
//! queries need to know about one project, loaded from TOML:
//!
//! ```toml
//! project_path = "group/project"
//! default_branch = "main"
//! branches = ["main", "develop"]
//! exceptions_enabled = true
//!
//! [[protected_branches]]
//! id = 1
//! name = "main"
//!
//! [users]
//! alice = 10
//!
//! [limits]
//! approvers = 300
//! ```

use crate::error::{Result, SecpolError};
use secpol_approval::{
    ProjectionLimits, ProtectedBranchRef, StaticApprovers, ACTIVE_SCAN_RESULT_POLICIES_LIMIT,
    APPROVERS_LIMIT, RULES_PER_POLICY_LIMIT,
};
use secpol_branch::{ProjectBranches, ResolverOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Platform limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Enabled scan-result policies that take effect
    pub active_scan_result_policies: usize,
    /// Scan-finding rules projected per policy
    pub rules_per_policy: usize,
    /// Approvers of each kind per rule
    pub approvers: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            active_scan_result_policies: ACTIVE_SCAN_RESULT_POLICIES_LIMIT,
            rules_per_policy: RULES_PER_POLICY_LIMIT,
            approvers: APPROVERS_LIMIT,
        }
    }
}

impl Limits {
    /// Limits used by the approval projector
    #[inline]
    #[must_use]
    pub fn projection(&self) -> ProjectionLimits {
        ProjectionLimits::default()
            .with_rules_per_policy(self.rules_per_policy)
            .with_approvers(self.approvers)
    }
}

/// Project under evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectContext {
    /// Full path, used for qualified branch exceptions
    pub project_path: Option<String>,
    pub default_branch: Option<String>,
    /// Every branch in the repository
    pub branches: Vec<String>,
    pub protected_branches: Vec<ProtectedBranchRef>,
    /// Username -> user id
    pub users: BTreeMap<String, u64>,
    /// Group full path -> group id
    pub groups: BTreeMap<String, u64>,
    pub exceptions_enabled: bool,
    pub scan_result_policies_enabled: bool,
    pub limits: Limits,
}

impl Default for ProjectContext {
    fn default() -> Self {
        Self {
            project_path: None,
            default_branch: None,
            branches: Vec::new(),
            protected_branches: Vec::new(),
            users: BTreeMap::new(),
            groups: BTreeMap::new(),
            exceptions_enabled: false,
            scan_result_policies_enabled: true,
            limits: Limits::default(),
        }
    }
}

impl ProjectContext {
    /// Create empty context
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse context from TOML
    ///
    /// # Errors
    /// Returns [`SecpolError::Config`] for malformed TOML or unknown value types.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SecpolError::Config(e.to_string()))
    }

    /// Read context from a TOML file
    ///
    /// # Errors
    /// Returns [`SecpolError::Io`] if the file cannot be read and
    /// [`SecpolError::Config`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SecpolError::io(path, e))?;
        let context = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            branches = context.branches.len(),
            protected = context.protected_branches.len(),
            "loaded project context"
        );
        Ok(context)
    }

    /// With project path
    #[inline]
    #[must_use]
    pub fn with_project_path(mut self, path: impl Into<String>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    /// With default branch
    #[inline]
    #[must_use]
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    /// With repository branches
    #[must_use]
    pub fn with_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = branches.into_iter().map(Into::into).collect();
        self
    }

    /// With an additional protected-branch record
    #[must_use]
    pub fn with_protected_branch(mut self, id: u64, name: impl Into<String>) -> Self {
        self.protected_branches.push(ProtectedBranchRef::new(id, name));
        self
    }

    /// With user id
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, id: u64) -> Self {
        self.users.insert(username.into(), id);
        self
    }

    /// With group id
    #[must_use]
    pub fn with_group(mut self, path: impl Into<String>, id: u64) -> Self {
        self.groups.insert(path.into(), id);
        self
    }

    /// With branch exceptions toggle
    #[inline]
    #[must_use]
    pub fn with_exceptions_enabled(mut self, enabled: bool) -> Self {
        self.exceptions_enabled = enabled;
        self
    }

    /// With scan-result policies toggle
    #[inline]
    #[must_use]
    pub fn with_scan_result_policies_enabled(mut self, enabled: bool) -> Self {
        self.scan_result_policies_enabled = enabled;
        self
    }

    /// With limits
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Branch facts for the resolver
    #[must_use]
    pub fn project_branches(&self) -> ProjectBranches {
        let protected = self.protected_branches.iter().map(|branch| branch.name.as_str());
        let project = ProjectBranches::new(self.branches.iter().map(String::as_str)).with_protected(protected);
        match &self.default_branch {
            Some(default) => project.with_default_branch(default.as_str()),
            None => project,
        }
    }

    /// Resolver toggles
    #[must_use]
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            exceptions_enabled: self.exceptions_enabled,
            project_path: self.project_path.clone(),
        }
    }

    /// Approver directory
    #[must_use]
    pub fn approvers(&self) -> StaticApprovers {
        StaticApprovers::from_maps(
            self.users.iter().map(|(name, id)| (name.clone(), *id)).collect(),
            self.groups.iter().map(|(path, id)| (path.clone(), *id)).collect(),
        )
    }
}
