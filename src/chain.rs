//! Chain composition and the two dispatch loops.
//!
//! Dispatch is two nested loops with separate exit vocabularies. The outer
//! loop walks a cursor over the payloads matched for this request and runs
//! until it pulls the end-of-chain sentinel. The inner loop runs the
//! members of one grouped payload and stops early on
//! [`Signal::ExitArray`] — a group-scoped exit that the outer loop reads
//! as "move on to the next entry", never as "stop everything".
//!
//! Exactly one middleware is in flight at any moment: every invocation is
//! awaited to completion before the engine touches the cursor again, so a
//! later middleware can rely on the side effects of an earlier one.

use tracing::trace;

use crate::error::Error;
use crate::middleware::{BoxedMiddleware, Payload};
use crate::registry::{Entry, RegistrationKey};
use crate::signal::Signal;

/// Insertion-ordered cursor over the payloads matched for one request.
pub(crate) struct Chain<'r, R> {
    steps: std::vec::IntoIter<&'r Payload<R>>,
}

/// One step pulled from the cursor: a runnable payload, or the termination
/// sentinel. The sentinel is not a value that can be invoked — pulling
/// past the last payload always yields `End`, however often the cursor is
/// polled.
pub(crate) enum ChainStep<'r, R> {
    Run(&'r Payload<R>),
    End,
}

impl<'r, R> Chain<'r, R> {
    /// Walks `entries` in registration order and materializes the payloads
    /// this request matches.
    ///
    /// The walk stops right after the first non-transparent match, so
    /// entries registered later are never evaluated — their predicates do
    /// not even run. If no entry is non-transparent the walk covers the
    /// whole table and the chain ends at exhaustion.
    pub(crate) fn compose(
        entries: &'r [(RegistrationKey, Entry<R>)],
        path: &str,
        method: &str,
    ) -> Self {
        let mut steps = Vec::new();
        for (_, entry) in entries {
            if !entry.accepts(path, method) {
                continue;
            }
            steps.push(&entry.payload);
            if !entry.transparent {
                break;
            }
        }
        trace!(path, method, matched = steps.len(), "chain composed");
        Self { steps: steps.into_iter() }
    }

    fn next(&mut self) -> ChainStep<'r, R> {
        match self.steps.next() {
            Some(payload) => ChainStep::Run(payload),
            None => ChainStep::End,
        }
    }
}

/// The outer chain loop.
///
/// Pulls one step at a time and interprets its result at chain scope: a
/// single middleware's signal becomes the exit code directly (`None`
/// defaulting to [`Signal::ContinueChain`]), a group contributes whatever
/// the sub-loop resolved to, and the sentinel resolves to
/// [`Signal::ExitChain`] — the only exit the loop condition tests for.
pub(crate) async fn drive<R>(mut chain: Chain<'_, R>, request: &mut R) -> Result<(), Error> {
    let mut exit = Signal::ContinueChain;
    while exit != Signal::ExitChain {
        exit = match chain.next() {
            ChainStep::End => Signal::ExitChain,
            ChainStep::Run(Payload::Single(middleware)) => middleware
                .invoke(request)
                .await?
                .unwrap_or(Signal::ContinueChain),
            ChainStep::Run(Payload::Group(members)) => run_group(members, request).await?,
        };
        trace!(signal = %exit, "chain step");
    }
    Ok(())
}

/// The array sub-loop: members run in order, each awaited to completion.
///
/// A member's signal is read at array scope — anything but
/// [`Signal::ExitArray`] (including chain-scope signals) means "proceed to
/// the next member". On `ExitArray` the rest of the group is skipped and
/// `ExitArray` is handed to the chain loop, which moves on to the next
/// entry. A group that runs to completion resolves to
/// [`Signal::ContinueChain`].
async fn run_group<R>(members: &[BoxedMiddleware<R>], request: &mut R) -> Result<Signal, Error> {
    for member in members {
        let signal = member
            .invoke(request)
            .await?
            .unwrap_or(Signal::ContinueArray);
        if signal == Signal::ExitArray {
            return Ok(Signal::ExitArray);
        }
    }
    Ok(Signal::ContinueChain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{PathMatcher, RegexMatcher};
    use crate::middleware::{boxed, from_fn};

    async fn noop(_: &mut ()) {}

    fn entry(pattern: &str, transparent: bool) -> (RegistrationKey, Entry<()>) {
        let key = RegistrationKey::new(pattern, None);
        let entry = Entry {
            payload: Payload::Single(boxed(from_fn(noop))),
            predicate: RegexMatcher.compile(pattern).unwrap(),
            methods: None,
            transparent,
        };
        (key, entry)
    }

    #[test]
    fn compose_stops_after_first_opaque_match() {
        let entries = vec![
            entry("/api/(.*)", true),
            entry("/api/a", false),
            entry("(.*)/api/a", true),
        ];
        let mut chain = Chain::compose(&entries, "/api/a", "GET");
        assert!(matches!(chain.next(), ChainStep::Run(_)));
        assert!(matches!(chain.next(), ChainStep::Run(_)));
        assert!(matches!(chain.next(), ChainStep::End));
    }

    #[test]
    fn exhausted_cursor_keeps_yielding_the_sentinel() {
        let entries = vec![entry("/api/a", false)];
        let mut chain = Chain::compose(&entries, "/api/a", "GET");
        assert!(matches!(chain.next(), ChainStep::Run(_)));
        assert!(matches!(chain.next(), ChainStep::End));
        assert!(matches!(chain.next(), ChainStep::End));
    }

    #[test]
    fn compose_of_no_matches_is_just_the_sentinel() {
        let entries = vec![entry("/api/a", true)];
        let mut chain = Chain::compose(&entries, "/other", "GET");
        assert!(matches!(chain.next(), ChainStep::End));
    }
}
