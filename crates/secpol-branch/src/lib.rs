//! secpol Branch Resolution
//!
//! Glob matching of branch patterns and resolution of policy rules to the
//! concrete branches of a project.
//!
//! # Core Concepts
//!
//! - [`BranchPattern`]: Anchored, case-sensitive shell-glob pattern
//! - [`match_branches`]: Filter candidate branches by a pattern, preserving order
//! - [`BranchResolver`]: Rules + project branches -> applicable branch set
//! - [`ProjectBranches`] / [`ResolverOptions`]: Inputs passed in by the caller
//!
//! # Example
//!
//! ```rust
//! use secpol_branch::{BranchResolver, ProjectBranches, ResolverOptions};
//! use secpol_document::{BranchScope, PolicyRule};
//!
//! let project = ProjectBranches::new(["main", "dev", "release"])
//!     .with_protected(["main", "release"]);
//! let resolver = BranchResolver::new(&project, ResolverOptions::default());
//!
//! let rules = [PolicyRule::scan_finding(BranchScope::branches(Vec::<String>::new()))];
//! let branches = resolver.scan_result_branches(&rules);
//! assert_eq!(branches.into_iter().collect::<Vec<_>>(), ["main", "release"]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod pattern;
mod resolver;

pub use pattern::{match_branches, BranchPattern};
pub use resolver::{BranchResolver, ProjectBranches, ResolverOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
