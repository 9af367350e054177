//! Policy rules and branch targeting
//!
//! Every rule kind carries a [`BranchScope`]. The scope either names a
//! symbolic [`BranchType`], lists explicit branch patterns, or leaves the
//! target unspecified; exceptions are subtracted afterwards.

use crate::action::ScanType;
use serde::{Deserialize, Serialize};

/// Symbolic branch selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchType {
    /// Every branch in the repository
    All,
    /// Branches matched by any protected-branch pattern
    Protected,
    /// The project's default branch
    Default,
}

/// Branch removed from an otherwise matched set
///
/// A qualified exception only applies to the project at `full_path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchException {
    Name(String),
    Qualified { name: String, full_path: String },
}

impl BranchException {
    /// Branch name or pattern
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Qualified { name, .. } => name,
        }
    }

    /// Whether this exception is honoured for the project at `project_path`
    #[must_use]
    pub fn applies_to(&self, project_path: Option<&str>) -> bool {
        match self {
            Self::Name(_) => true,
            Self::Qualified { full_path, .. } => project_path == Some(full_path.as_str()),
        }
    }
}

/// Branch targeting shared by every rule kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_type: Option<BranchType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_exceptions: Vec<BranchException>,
}

/// Borrowed view of what a [`BranchScope`] selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTarget<'a> {
    Type(BranchType),
    Patterns(&'a [String]),
    Unspecified,
}

impl BranchScope {
    /// Scope listing explicit branch patterns
    #[must_use]
    pub fn branches<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            branches: Some(patterns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Scope selecting a branch type
    #[inline]
    #[must_use]
    pub fn branch_type(branch_type: BranchType) -> Self {
        Self {
            branch_type: Some(branch_type),
            ..Self::default()
        }
    }

    /// With an additional exception
    #[inline]
    #[must_use]
    pub fn with_exception(mut self, exception: BranchException) -> Self {
        self.branch_exceptions.push(exception);
        self
    }

    /// What this scope selects; `branch_type` wins over `branches`
    #[must_use]
    pub fn target(&self) -> BranchTarget<'_> {
        match (self.branch_type, self.branches.as_deref()) {
            (Some(branch_type), _) => BranchTarget::Type(branch_type),
            (None, Some(patterns)) => BranchTarget::Patterns(patterns),
            (None, None) => BranchTarget::Unspecified,
        }
    }

    /// `branches: []` written explicitly
    #[inline]
    #[must_use]
    pub fn has_empty_branch_list(&self) -> bool {
        self.branch_type.is_none() && self.branches.as_ref().is_some_and(Vec::is_empty)
    }
}

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

/// Vulnerability state a scan-finding rule reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityState {
    NewlyDetected,
    Detected,
    Confirmed,
    Resolved,
    Dismissed,
}

/// License state a license-finding rule reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseState {
    NewlyDetected,
    Detected,
}

/// Scan-execution rule triggered by pipelines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRule {
    #[serde(flatten)]
    pub scope: BranchScope,
}

/// Scan-execution rule triggered on a cron cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub cadence: String,

    #[serde(flatten)]
    pub scope: BranchScope,
}

/// Scan-result rule over security scan findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFindingRule {
    #[serde(flatten)]
    pub scope: BranchScope,

    #[serde(default)]
    pub scanners: Vec<ScanType>,

    #[serde(default)]
    pub vulnerabilities_allowed: u32,

    #[serde(default)]
    pub severity_levels: Vec<Severity>,

    #[serde(default)]
    pub vulnerability_states: Vec<VulnerabilityState>,
}

/// Scan-result rule over detected licenses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFindingRule {
    #[serde(flatten)]
    pub scope: BranchScope,

    #[serde(default)]
    pub match_on_inclusion: bool,

    #[serde(default)]
    pub license_types: Vec<String>,

    #[serde(default)]
    pub license_states: Vec<LicenseState>,
}

/// Policy rule, keyed by the YAML `type` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyRule {
    Pipeline(PipelineRule),
    Schedule(ScheduleRule),
    ScanFinding(ScanFindingRule),
    LicenseFinding(LicenseFindingRule),
}

/// Discriminant of [`PolicyRule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Pipeline,
    Schedule,
    ScanFinding,
    LicenseFinding,
}

impl PolicyRule {
    /// Pipeline rule over the given branch patterns
    #[must_use]
    pub fn pipeline(scope: BranchScope) -> Self {
        Self::Pipeline(PipelineRule { scope })
    }

    /// Schedule rule with cron `cadence`
    #[must_use]
    pub fn schedule(cadence: impl Into<String>, scope: BranchScope) -> Self {
        Self::Schedule(ScheduleRule {
            cadence: cadence.into(),
            scope,
        })
    }

    /// Scan-finding rule with default thresholds
    #[must_use]
    pub fn scan_finding(scope: BranchScope) -> Self {
        Self::ScanFinding(ScanFindingRule {
            scope,
            ..ScanFindingRule::default()
        })
    }

    /// Rule kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Pipeline(_) => RuleKind::Pipeline,
            Self::Schedule(_) => RuleKind::Schedule,
            Self::ScanFinding(_) => RuleKind::ScanFinding,
            Self::LicenseFinding(_) => RuleKind::LicenseFinding,
        }
    }

    /// Branch scope of this rule
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &BranchScope {
        match self {
            Self::Pipeline(rule) => &rule.scope,
            Self::Schedule(rule) => &rule.scope,
            Self::ScanFinding(rule) => &rule.scope,
            Self::LicenseFinding(rule) => &rule.scope,
        }
    }
}
