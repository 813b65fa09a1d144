//! Path-pattern matchers.
//!
//! The registry treats pattern matching as a pluggable contract: a matcher
//! compiles each route pattern once, at registration, into a predicate the
//! engine calls with the already-stripped request path. Two matchers ship
//! with the crate; anything implementing [`PathMatcher`] slots in via
//! [`Registry::with_matcher`](crate::Registry::with_matcher).

use matchit::Router as MatchitRouter;
use regex::Regex;

use crate::error::Error;

/// A compiled route pattern: answers "does this path match?".
pub type RoutePredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Compiles route patterns into path predicates.
///
/// Compilation happens once per registration, never per request. The
/// predicate only ever sees paths with the query string and fragment
/// already stripped.
pub trait PathMatcher: Send + Sync {
    fn compile(&self, pattern: &str) -> Result<RoutePredicate, Error>;
}

// ── RegexMatcher ──────────────────────────────────────────────────────────────

/// The default matcher: route patterns are regular expressions.
///
/// Patterns are anchored to the full path and tolerate one trailing slash,
/// so `/api/a` matches `/api/a` and `/api/a/` but not `/api/a/b`, while
/// `/api/(.*)` matches anything below `/api/`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegexMatcher;

impl PathMatcher for RegexMatcher {
    fn compile(&self, pattern: &str) -> Result<RoutePredicate, Error> {
        let regex = Regex::new(&format!("^(?:{pattern})/?$"))
            .map_err(|e| Error::pattern(pattern, e))?;
        Ok(Box::new(move |path| regex.is_match(path)))
    }
}

// ── RadixMatcher ──────────────────────────────────────────────────────────────

/// Radix-tree matcher with `{param}` / `{*wildcard}` syntax.
///
/// Backed by [`matchit`] — O(path-length) per check, no backtracking. Use
/// this when routes are literal segment patterns rather than regular
/// expressions.
#[derive(Clone, Copy, Debug, Default)]
pub struct RadixMatcher;

impl PathMatcher for RadixMatcher {
    fn compile(&self, pattern: &str) -> Result<RoutePredicate, Error> {
        let mut tree = MatchitRouter::new();
        tree.insert(pattern, ()).map_err(|e| Error::pattern(pattern, e))?;
        Ok(Box::new(move |path| tree.at(path).is_ok()))
    }
}
