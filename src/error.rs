//! Unified error type.

use std::fmt;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by strata's fallible operations.
///
/// Routing decisions (no match, method mismatch) are not errors — the chain
/// simply ends. This type surfaces the two genuine failures: a route
/// pattern the matcher cannot compile, and a middleware fault that aborted
/// the chain.
#[derive(Debug)]
pub enum Error {
    /// The path matcher rejected a route pattern.
    Pattern {
        /// The pattern as passed to registration.
        pattern: String,
        /// The matcher's own diagnosis.
        source: Source,
    },
    /// A middleware failed. The rest of the chain was abandoned.
    Handler(Source),
}

impl Error {
    /// Wraps a matcher failure for `pattern`.
    pub fn pattern(pattern: impl Into<String>, source: impl Into<Source>) -> Self {
        Self::Pattern { pattern: pattern.into(), source: source.into() }
    }

    /// Wraps a middleware fault.
    pub fn handler(source: impl Into<Source>) -> Self {
        Self::Handler(source.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern { pattern, source } => {
                write!(f, "invalid route pattern `{pattern}`: {source}")
            }
            Self::Handler(source) => write!(f, "middleware failed: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern { source, .. } | Self::Handler(source) => Some(source.as_ref()),
        }
    }
}
