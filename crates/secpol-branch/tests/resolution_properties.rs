//! Property tests for branch matching and resolution.
//!
//! These exercise the set-algebra guarantees the resolver gives to callers:
//! wildcard identity, exception subtraction, the protected-only restriction
//! of scan-result policies and the empty-repository short circuit.

use proptest::prelude::*;
use secpol_branch::{match_branches, BranchResolver, ProjectBranches, ResolverOptions};
use secpol_document::{BranchException, BranchScope, PolicyRule, PolicyType};
use std::collections::BTreeSet;

fn branch_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}",
        "release/[0-9]{1,2}",
        "feature/[a-z]{1,4}",
    ]
}

fn branch_list() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(branch_name(), 1..12)
}

fn pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        branch_name(),
        Just("*".to_string()),
        Just("release/*".to_string()),
        Just("feature/?*".to_string()),
        Just("[a-z]?".to_string()),
    ]
}

fn patterns() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(pattern(), 0..4)
}

proptest! {
    /// Tenet: `*` returns every candidate in input order.
    #[test]
    fn prop_star_is_identity(branches in branch_list()) {
        let matched = match_branches("*", &branches);
        let expected: Vec<&str> = branches.iter().map(String::as_str).collect();
        prop_assert_eq!(matched, expected);
    }

    /// Tenet: matches are always a subsequence of the candidates.
    #[test]
    fn prop_matches_preserve_candidate_order(branches in branch_list(), pattern in pattern()) {
        let matched = match_branches(&pattern, &branches);
        let mut remaining = branches.iter().map(String::as_str);
        for branch in matched {
            prop_assert!(remaining.any(|candidate| candidate == branch));
        }
    }

    /// Tenet: exceptions only ever remove branches.
    ///
    /// resolve(R with exceptions E) ⊆ resolve(R) \ resolve(E)
    #[test]
    fn prop_exceptions_subtract(
        branches in branch_list(),
        included in patterns(),
        excepted in patterns(),
    ) {
        let project = ProjectBranches::new(branches);
        let resolver = BranchResolver::new(&project, ResolverOptions::with_exceptions("group/app"));

        let mut scope = BranchScope::branches(included.clone());
        for name in &excepted {
            scope = scope.with_exception(BranchException::Name(name.clone()));
        }
        let with_exceptions = resolver.scan_execution_branches(&[PolicyRule::pipeline(scope)]);

        let base = resolver.scan_execution_branches(&[PolicyRule::pipeline(BranchScope::branches(included))]);
        let removed = resolver.scan_execution_branches(&[PolicyRule::pipeline(BranchScope::branches(excepted))]);
        let expected: BTreeSet<String> = base.difference(&removed).cloned().collect();

        prop_assert!(with_exceptions.is_subset(&expected));
    }

    /// Tenet: scan-result policies never reach unprotected branches.
    #[test]
    fn prop_scan_result_stays_protected(
        branches in branch_list(),
        protected in patterns(),
        included in patterns(),
    ) {
        let project = ProjectBranches::new(branches).with_protected(protected);
        let resolver = BranchResolver::new(&project, ResolverOptions::default());

        let resolved = resolver.scan_result_branches(&[PolicyRule::scan_finding(BranchScope::branches(included))]);
        prop_assert!(resolved.is_subset(&resolver.protected_branches()));
    }

    /// Tenet: an empty repository resolves to nothing, whatever the rules say.
    #[test]
    fn prop_empty_repository(included in patterns(), protected in patterns()) {
        let project = ProjectBranches::default().with_protected(protected);
        let resolver = BranchResolver::new(&project, ResolverOptions::default());
        let rules = [PolicyRule::pipeline(BranchScope::branches(included))];

        for policy_type in PolicyType::ALL {
            prop_assert!(resolver.resolve(&rules, policy_type).is_empty());
        }
    }
}
