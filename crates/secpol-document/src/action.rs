//! Policy actions

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Security scanner kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Sast,
    SastIac,
    Dast,
    SecretDetection,
    ContainerScanning,
    DependencyScanning,
    ClusterImageScanning,
    CoverageFuzzing,
    ApiFuzzing,
}

impl ScanType {
    /// YAML spelling
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sast => "sast",
            Self::SastIac => "sast_iac",
            Self::Dast => "dast",
            Self::SecretDetection => "secret_detection",
            Self::ContainerScanning => "container_scanning",
            Self::DependencyScanning => "dependency_scanning",
            Self::ClusterImageScanning => "cluster_image_scanning",
            Self::CoverageFuzzing => "coverage_fuzzing",
            Self::ApiFuzzing => "api_fuzzing",
        }
    }

    /// Whether a scan-execution policy may run this scan
    ///
    /// Fuzzing results can be gated on by scan-result rules but are never
    /// scheduled by a scan action.
    #[inline]
    #[must_use]
    pub fn is_executable(self) -> bool {
        !matches!(self, Self::CoverageFuzzing | Self::ApiFuzzing)
    }

    /// DAST runs on demand against a site profile instead of inside the pipeline
    #[inline]
    #[must_use]
    pub fn is_on_demand(self) -> bool {
        matches!(self, Self::Dast)
    }
}

impl Display for ScanType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role that may approve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleApprover {
    Developer,
    Maintainer,
    Owner,
}

/// Run a scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanAction {
    pub scan: ScanType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanner_profile: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl ScanAction {
    /// Scan action without tags, profiles or variables
    #[inline]
    #[must_use]
    pub fn new(scan: ScanType) -> Self {
        Self {
            scan,
            tags: Vec::new(),
            site_profile: None,
            scanner_profile: None,
            variables: BTreeMap::new(),
        }
    }

    /// DAST action bound to site and scanner profiles
    #[must_use]
    pub fn dast(site_profile: impl Into<String>, scanner_profile: impl Into<String>) -> Self {
        Self {
            site_profile: Some(site_profile.into()),
            scanner_profile: Some(scanner_profile.into()),
            ..Self::new(ScanType::Dast)
        }
    }
}

/// The `type` tag of an approval action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalActionKind {
    #[default]
    RequireApproval,
}

/// Require approvals before merging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalAction {
    #[serde(rename = "type")]
    pub kind: ApprovalActionKind,

    pub approvals_required: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_approvers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_approvers_ids: Vec<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_approvers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_approvers_ids: Vec<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role_approvers: Vec<RoleApprover>,
}

impl ApprovalAction {
    /// Approval action with no approvers yet
    #[inline]
    #[must_use]
    pub fn new(approvals_required: u32) -> Self {
        Self {
            kind: ApprovalActionKind::RequireApproval,
            approvals_required,
            user_approvers: Vec::new(),
            user_approvers_ids: Vec::new(),
            group_approvers: Vec::new(),
            group_approvers_ids: Vec::new(),
            role_approvers: Vec::new(),
        }
    }

    /// With user approvers by username
    #[must_use]
    pub fn with_user_approvers<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_approvers.extend(usernames.into_iter().map(Into::into));
        self
    }

    /// With group approvers by full path
    #[must_use]
    pub fn with_group_approvers<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_approvers.extend(paths.into_iter().map(Into::into));
        self
    }
}

/// Policy action
///
/// Scan actions carry no `type` key in YAML; approval actions are tagged
/// `type: require_approval`. Deserialization dispatches on that key so a
/// malformed action reports the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PolicyAction {
    RequireApproval(ApprovalAction),
    Scan(ScanAction),
}

impl<'de> Deserialize<'de> for PolicyAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(D::Error::custom("policy action must be a mapping"));
        }

        if value.get("type").is_some() {
            ApprovalAction::deserialize(value)
                .map(Self::RequireApproval)
                .map_err(D::Error::custom)
        } else {
            ScanAction::deserialize(value)
                .map(Self::Scan)
                .map_err(D::Error::custom)
        }
    }
}
