//! Approver name resolution

use std::collections::HashMap;

/// Resolves approver names to ids
///
/// Unknown names are dropped; the order of known names is kept.
pub trait ApproverLookup {
    /// Ids of users named by `usernames`
    fn user_ids(&self, usernames: &[String]) -> Vec<u64>;

    /// Ids of groups at `paths`
    fn group_ids(&self, paths: &[String]) -> Vec<u64>;
}

/// Map-backed approver directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticApprovers {
    users: HashMap<String, u64>,
    groups: HashMap<String, u64>,
}

impl StaticApprovers {
    /// Create empty directory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory over existing maps
    #[must_use]
    pub fn from_maps(users: HashMap<String, u64>, groups: HashMap<String, u64>) -> Self {
        Self { users, groups }
    }

    /// With user
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, id: u64) -> Self {
        self.users.insert(username.into(), id);
        self
    }

    /// With group
    #[must_use]
    pub fn with_group(mut self, path: impl Into<String>, id: u64) -> Self {
        self.groups.insert(path.into(), id);
        self
    }
}

impl ApproverLookup for StaticApprovers {
    fn user_ids(&self, usernames: &[String]) -> Vec<u64> {
        usernames.iter().filter_map(|name| self.users.get(name).copied()).collect()
    }

    fn group_ids(&self, paths: &[String]) -> Vec<u64> {
        paths.iter().filter_map(|path| self.groups.get(path).copied()).collect()
    }
}
