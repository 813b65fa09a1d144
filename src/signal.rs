//! Exit-signal vocabulary for the two dispatch loops.
//!
//! One enum, two scopes. The chain scope decides whether enumeration of
//! registry entries continues; the array scope decides whether the members
//! of a single grouped entry continue. The scopes are deliberately
//! disjoint: [`Signal::ExitArray`] ends the enclosing group and nothing
//! else, while [`Signal::ExitChain`] is what the engine's end-of-chain
//! sentinel resolves to.

use std::fmt;

/// A control signal returned by a middleware invocation.
///
/// Middleware that has nothing to say returns no signal at all (`()` or
/// `None` through [`IntoSignal`](crate::IntoSignal)); the engine fills in
/// the continue default for whichever loop issued the call. A signal from
/// the wrong scope — say [`Signal::ContinueChain`] out of an array member —
/// is likewise treated as that loop's continue default.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Signal {
    // Chain scope ──────────────────────────────────────────────────────────────
    /// Keep enumerating registry entries.
    ContinueChain,
    /// Stop the whole chain. Emitted by the end-of-chain sentinel.
    ExitChain,
    // Array scope ──────────────────────────────────────────────────────────────
    /// Proceed to the next member of the enclosing group.
    ContinueArray,
    /// Stop the enclosing group; the outer chain moves on to its next entry.
    ExitArray,
}

impl Signal {
    /// Returns the uppercase wire-style name (e.g. `"EXIT_ARRAY"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContinueChain => "CONTINUE_CHAIN",
            Self::ContinueArray => "CONTINUE_ARRAY",
            Self::ExitChain     => "EXIT_CHAIN",
            Self::ExitArray     => "EXIT_ARRAY",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
