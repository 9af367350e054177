//! Branch glob patterns
//!
//! Shell-glob semantics over whole branch names: `*` matches any run of
//! characters (including `/`), `?` matches exactly one character. There is
//! no recursive `**`; it behaves like `*`. Matching is case-sensitive and
//! anchored at both ends.

use regex::Regex;
use std::fmt::{self, Display, Formatter};

const GLOB_METACHARACTERS: [char; 2] = ['*', '?'];

/// Compiled branch pattern
#[derive(Debug, Clone)]
pub struct BranchPattern {
    source: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Exact,
    Glob(Regex),
}

impl BranchPattern {
    /// Compile `pattern`
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let matcher = if source.contains(GLOB_METACHARACTERS) {
            match Regex::new(&glob_to_regex(&source)) {
                Ok(regex) => Matcher::Glob(regex),
                Err(error) => {
                    tracing::warn!(pattern = %source, %error, "uncompilable branch pattern, matching literally");
                    Matcher::Exact
                }
            }
        } else {
            Matcher::Exact
        };

        Self { source, matcher }
    }

    /// Pattern as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern contains glob metacharacters
    #[inline]
    #[must_use]
    pub fn is_glob(&self) -> bool {
        matches!(self.matcher, Matcher::Glob(_))
    }

    /// Whether `branch` matches this pattern in full
    #[must_use]
    pub fn matches(&self, branch: &str) -> bool {
        match &self.matcher {
            Matcher::Exact => self.source == branch,
            Matcher::Glob(regex) => regex.is_match(branch),
        }
    }

    /// Candidates matching this pattern, in candidate order
    pub fn filter<'a, S: AsRef<str>>(&self, candidates: &'a [S]) -> Vec<&'a str> {
        candidates
            .iter()
            .map(AsRef::as_ref)
            .filter(|candidate| self.matches(candidate))
            .collect()
    }
}

impl PartialEq for BranchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for BranchPattern {}

impl Display for BranchPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for BranchPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

/// Branches in `candidates` matching `pattern`, preserving candidate order
///
/// Never fails: a pattern that matches nothing yields an empty list.
pub fn match_branches<'a, S: AsRef<str>>(pattern: &str, candidates: &'a [S]) -> Vec<&'a str> {
    BranchPattern::new(pattern).filter(candidates)
}

fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    let mut literal = String::new();

    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
                regex.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }

    regex.push_str(&regex::escape(&literal));
    regex.push('$');
    regex
}
