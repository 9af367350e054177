//! Policy branch resolution
//!
//! Computes the set of branches a list of policy rules applies to:
//!
//! ```text
//! included = ⋃ matched(rule)
//! included = included ∩ protected        (scan-result policies only)
//! excluded = ⋃ exceptions(rule)           (when exceptions are enabled)
//! result   = included − excluded
//! ```

use crate::pattern::BranchPattern;
use parking_lot::RwLock;
use secpol_document::{BranchTarget, BranchType, PolicyRule, PolicyType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Branch facts about the project under evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBranches {
    /// Every branch in the repository
    #[serde(default)]
    pub branches: Vec<String>,

    /// Protected-branch names or patterns
    #[serde(default)]
    pub protected_branches: Vec<String>,

    /// Configured default branch
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl ProjectBranches {
    /// Project with the given branches and no protection
    #[must_use]
    pub fn new<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            branches: branches.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// With protected-branch names or patterns
    #[must_use]
    pub fn with_protected<I, S>(mut self, protected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_branches = protected.into_iter().map(Into::into).collect();
        self
    }

    /// With default branch
    #[must_use]
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }
}

/// Resolver toggles passed in by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Subtract `branch_exceptions`; when off, exceptions are ignored entirely
    #[serde(default)]
    pub exceptions_enabled: bool,

    /// Full path of the project, for qualified exceptions
    #[serde(default)]
    pub project_path: Option<String>,
}

impl ResolverOptions {
    /// Options with exceptions enabled for `project_path`
    #[must_use]
    pub fn with_exceptions(project_path: impl Into<String>) -> Self {
        Self {
            exceptions_enabled: true,
            project_path: Some(project_path.into()),
        }
    }
}

/// Resolves policy rules to branch names of one project
///
/// Rule and exception patterns are compiled on first use and kept for the
/// lifetime of the resolver.
#[derive(Debug)]
pub struct BranchResolver<'a> {
    project: &'a ProjectBranches,
    protected: BTreeSet<&'a str>,
    options: ResolverOptions,
    patterns: RwLock<HashMap<String, BranchPattern>>,
}

impl<'a> BranchResolver<'a> {
    /// Create resolver over `project`
    #[must_use]
    pub fn new(project: &'a ProjectBranches, options: ResolverOptions) -> Self {
        let protected = project
            .protected_branches
            .iter()
            .flat_map(|pattern| BranchPattern::new(pattern.as_str()).filter(&project.branches))
            .collect();

        Self {
            project,
            protected,
            options,
            patterns: RwLock::new(HashMap::new()),
        }
    }

    /// Project this resolver evaluates
    #[inline]
    #[must_use]
    pub fn project(&self) -> &'a ProjectBranches {
        self.project
    }

    /// Branches the `rules` of a `policy_type` policy apply to
    #[must_use]
    pub fn resolve(&self, rules: &[PolicyRule], policy_type: PolicyType) -> BTreeSet<String> {
        if self.project.branches.is_empty() {
            return BTreeSet::new();
        }

        let mut included: BTreeSet<&str> = rules
            .iter()
            .flat_map(|rule| self.matched_by_rule(rule, policy_type))
            .collect();

        if policy_type.is_scan_result() {
            included.retain(|branch| self.protected.contains(branch));
        }

        let excluded = self.excluded_branches(rules);
        included.retain(|branch| !excluded.contains(branch));

        tracing::debug!(
            %policy_type,
            rules = rules.len(),
            branches = included.len(),
            excluded = excluded.len(),
            "resolved policy branches"
        );

        included.into_iter().map(String::from).collect()
    }

    /// Branches targeted by scan-execution `rules`
    #[inline]
    #[must_use]
    pub fn scan_execution_branches(&self, rules: &[PolicyRule]) -> BTreeSet<String> {
        self.resolve(rules, PolicyType::ScanExecutionPolicy)
    }

    /// Protected branches targeted by scan-result `rules`
    #[inline]
    #[must_use]
    pub fn scan_result_branches(&self, rules: &[PolicyRule]) -> BTreeSet<String> {
        self.resolve(rules, PolicyType::ScanResultPolicy)
    }

    /// Whether `rules` apply to `branch`
    #[must_use]
    pub fn applies_to_branch(&self, rules: &[PolicyRule], policy_type: PolicyType, branch: &str) -> bool {
        self.resolve(rules, policy_type).contains(branch)
    }

    /// Existing branches matched by any protected-branch pattern
    #[must_use]
    pub fn protected_branches(&self) -> BTreeSet<String> {
        self.protected.iter().copied().map(String::from).collect()
    }

    fn protected_set(&self) -> Vec<&'a str> {
        self.protected.iter().copied().collect()
    }

    /// Branches matching `pattern`, compiling it at most once per resolver
    fn filter(&self, pattern: &str) -> Vec<&'a str> {
        let project = self.project;
        let branches = &project.branches;
        if let Some(compiled) = self.patterns.read().get(pattern) {
            return compiled.filter(branches);
        }

        let compiled = BranchPattern::new(pattern);
        let matched = compiled.filter(branches);
        self.patterns.write().insert(pattern.to_owned(), compiled);
        matched
    }

    fn matched_by_rule(&self, rule: &PolicyRule, policy_type: PolicyType) -> Vec<&'a str> {
        let project = self.project;
        let all = &project.branches;

        match rule.scope().target() {
            BranchTarget::Type(BranchType::All) => all.iter().map(String::as_str).collect(),
            BranchTarget::Type(BranchType::Protected) => self.protected_set(),
            BranchTarget::Type(BranchType::Default) => project
                .default_branch
                .as_deref()
                .and_then(|default| all.iter().find(|branch| branch.as_str() == default))
                .map(String::as_str)
                .into_iter()
                .collect(),
            BranchTarget::Patterns(patterns) if patterns.is_empty() && policy_type.is_scan_result() => {
                self.protected_set()
            }
            BranchTarget::Patterns(patterns) => patterns
                .iter()
                .flat_map(|pattern| self.filter(pattern))
                .collect(),
            BranchTarget::Unspecified if policy_type.is_scan_result() => self.protected_set(),
            BranchTarget::Unspecified => Vec::new(),
        }
    }

    fn excluded_branches(&self, rules: &[PolicyRule]) -> BTreeSet<&'a str> {
        if !self.options.exceptions_enabled {
            return BTreeSet::new();
        }

        let project_path = self.options.project_path.as_deref();
        rules
            .iter()
            .flat_map(|rule| rule.scope().branch_exceptions.iter())
            .filter(|exception| exception.applies_to(project_path))
            .flat_map(|exception| self.filter(exception.name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secpol_document::{BranchException, BranchScope};

    fn project() -> ProjectBranches {
        ProjectBranches::new(["main", "dev", "release/1.0", "release/2.0", "feature/x"])
            .with_protected(["main", "release/*"])
            .with_default_branch("main")
    }

    fn set(branches: &[&str]) -> BTreeSet<String> {
        branches.iter().map(|b| (*b).to_string()).collect()
    }

    fn exceptions() -> ResolverOptions {
        ResolverOptions::with_exceptions("group/app")
    }

    #[test]
    fn branch_type_all() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(BranchScope::branch_type(BranchType::All))];

        assert_eq!(
            resolver.scan_execution_branches(&rules),
            set(&["main", "dev", "release/1.0", "release/2.0", "feature/x"])
        );
    }

    #[test]
    fn branch_type_protected_unions_protected_patterns() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(BranchScope::branch_type(BranchType::Protected))];

        assert_eq!(
            resolver.scan_execution_branches(&rules),
            set(&["main", "release/1.0", "release/2.0"])
        );
    }

    #[test]
    fn branch_type_default() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::schedule(
            "0 0 * * *",
            BranchScope::branch_type(BranchType::Default),
        )];

        assert_eq!(resolver.scan_execution_branches(&rules), set(&["main"]));
    }

    #[test]
    fn default_branch_missing_from_repository() {
        let project = ProjectBranches::new(["dev"]).with_default_branch("main");
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(BranchScope::branch_type(BranchType::Default))];

        assert!(resolver.scan_execution_branches(&rules).is_empty());
    }

    #[test]
    fn patterns_compile_once_per_resolver() {
        let project = project();
        let resolver = BranchResolver::new(&project, exceptions());
        let scope = BranchScope::branches(["release/*", "dev"])
            .with_exception(BranchException::Name("release/2.0".into()));
        let rules = [
            PolicyRule::pipeline(scope),
            PolicyRule::schedule("0 0 * * *", BranchScope::branches(["release/*"])),
        ];

        for _ in 0..3 {
            assert_eq!(
                resolver.scan_execution_branches(&rules),
                set(&["dev", "release/1.0"])
            );
        }
        assert!(resolver.applies_to_branch(&rules, PolicyType::ScanExecutionPolicy, "dev"));

        let mut cached: Vec<String> = resolver.patterns.read().keys().cloned().collect();
        cached.sort();
        assert_eq!(cached, vec!["dev", "release/*", "release/2.0"]);
    }

    #[test]
    fn explicit_patterns_are_unioned() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [
            PolicyRule::pipeline(BranchScope::branches(["dev"])),
            PolicyRule::pipeline(BranchScope::branches(["release/*", "missing"])),
        ];

        assert_eq!(
            resolver.scan_execution_branches(&rules),
            set(&["dev", "release/1.0", "release/2.0"])
        );
    }

    #[test]
    fn scan_execution_does_not_intersect_with_protected() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(BranchScope::branches(["feature/*"]))];

        assert_eq!(resolver.scan_execution_branches(&rules), set(&["feature/x"]));
    }

    #[test]
    fn scan_result_intersects_with_protected() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::scan_finding(BranchScope::branches(["main", "dev"]))];

        assert_eq!(resolver.scan_result_branches(&rules), set(&["main"]));
    }

    #[test]
    fn scan_result_empty_branches_fall_back_to_protected() {
        let project =
            ProjectBranches::new(["main", "dev", "release"]).with_protected(["main", "release"]);
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::scan_finding(BranchScope::branches(Vec::<String>::new()))];

        assert_eq!(resolver.scan_result_branches(&rules), set(&["main", "release"]));
    }

    #[test]
    fn scan_execution_empty_branches_match_nothing() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(BranchScope::branches(Vec::<String>::new()))];

        assert!(resolver.scan_execution_branches(&rules).is_empty());
    }

    #[test]
    fn empty_repository_resolves_to_nothing() {
        let project = ProjectBranches::default().with_protected(["main"]);
        let resolver = BranchResolver::new(&project, exceptions());
        let rules = [
            PolicyRule::pipeline(BranchScope::branch_type(BranchType::All)),
            PolicyRule::scan_finding(BranchScope::default()),
        ];

        assert!(resolver.scan_execution_branches(&rules).is_empty());
        assert!(resolver.scan_result_branches(&rules).is_empty());
    }

    #[test]
    fn exceptions_are_subtracted() {
        let project = project();
        let resolver = BranchResolver::new(&project, exceptions());
        let rules = [PolicyRule::pipeline(
            BranchScope::branch_type(BranchType::All)
                .with_exception(BranchException::Name("release/*".to_string())),
        )];

        assert_eq!(
            resolver.scan_execution_branches(&rules),
            set(&["main", "dev", "feature/x"])
        );
    }

    #[test]
    fn exceptions_of_one_rule_apply_to_all_rules() {
        let project = project();
        let resolver = BranchResolver::new(&project, exceptions());
        let rules = [
            PolicyRule::pipeline(BranchScope::branches(["main", "dev"])),
            PolicyRule::pipeline(
                BranchScope::branches(["feature/x"])
                    .with_exception(BranchException::Name("main".to_string())),
            ),
        ];

        assert_eq!(resolver.scan_execution_branches(&rules), set(&["dev", "feature/x"]));
    }

    #[test]
    fn qualified_exception_only_for_matching_project() {
        let project = project();
        let rules = [PolicyRule::pipeline(
            BranchScope::branches(["main", "dev"]).with_exception(BranchException::Qualified {
                name: "dev".to_string(),
                full_path: "group/app".to_string(),
            }),
        )];

        let same = BranchResolver::new(&project, exceptions());
        assert_eq!(same.scan_execution_branches(&rules), set(&["main"]));

        let other = BranchResolver::new(&project, ResolverOptions::with_exceptions("group/other"));
        assert_eq!(other.scan_execution_branches(&rules), set(&["main", "dev"]));
    }

    #[test]
    fn disabled_exceptions_are_ignored() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(
            BranchScope::branches(["main"])
                .with_exception(BranchException::Name("main".to_string())),
        )];

        assert_eq!(resolver.scan_execution_branches(&rules), set(&["main"]));
    }

    #[test]
    fn applies_to_branch_checks_membership() {
        let project = project();
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(BranchScope::branches(["release/*"]))];

        assert!(resolver.applies_to_branch(&rules, PolicyType::ScanExecutionPolicy, "release/2.0"));
        assert!(!resolver.applies_to_branch(&rules, PolicyType::ScanExecutionPolicy, "main"));
    }
}
