//! # strata
//!
//! A deterministic middleware dispatch engine. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your framework owns the socket, TLS, parsing, and the response it
//! eventually writes. strata owns exactly one thing: deciding which
//! middleware runs for a request, in what order, and when the chain stops.
//! Every feature strata skips is one your framework already ships.
//!
//! What strata intentionally ignores:
//!
//! - **Transport** — no sockets, no wire format, purely in-process
//! - **Persistence** — one registry serves one request, then it's gone
//! - **Parallelism** — middleware runs strictly one at a time, because
//!   later middleware may depend on side effects of earlier middleware
//! - **Timeouts** — a stalled middleware stalls the chain; wrap `execute`
//!   in your runtime's deadline if you need one
//!
//! What's left — the only part that changes between applications:
//!
//! - **Ordered dispatch** — entries are walked in registration order,
//!   whatever order requests arrive in
//! - **Transparency** — a transparent entry lets the walk continue past
//!   its match; the first non-transparent match ends the chain
//! - **Two exit scopes** — [`Signal::ExitArray`] ends one grouped entry's
//!   sub-chain, [`Signal::ExitChain`] ends everything; the two never leak
//!   into each other
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strata::{from_fn, Config, Registry, RequestModel};
//!
//! struct Visit {
//!     path: String,
//!     method: String,
//!     log: Vec<&'static str>,
//! }
//!
//! impl RequestModel for Visit {
//!     fn path(&self) -> &str { &self.path }
//!     fn method(&self) -> &str { &self.method }
//! }
//!
//! async fn audit(visit: &mut Visit) {
//!     visit.log.push("audit");
//! }
//!
//! async fn serve(visit: &mut Visit) {
//!     visit.log.push("serve");
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut registry = Registry::new(Visit {
//!         path: "/api/users?page=2".to_owned(),
//!         method: "GET".to_owned(),
//!         log: Vec::new(),
//!     });
//!
//!     // Transparent: the walk continues past this match.
//!     registry.add("/api/(.*)", from_fn(audit), Config::default().transparent());
//!     // Non-transparent: the first match here ends the chain.
//!     registry.add("/api/users", from_fn(serve), Config::default().methods(["GET"]));
//!
//!     let visit = registry.execute().await.unwrap();
//!     assert_eq!(visit.log, ["audit", "serve"]);
//! }
//! ```
//!
//! Route patterns are regular expressions by default (anchored, query
//! string and fragment stripped before matching); swap in
//! [`RadixMatcher`] — or any [`PathMatcher`] of your own — via
//! [`Registry::with_matcher`].

mod chain;
mod error;
mod matcher;
mod middleware;
mod registry;
mod request;
mod signal;

pub use error::Error;
pub use matcher::{PathMatcher, RadixMatcher, RegexMatcher, RoutePredicate};
pub use middleware::{
    boxed, from_fn, BoxFuture, BoxedMiddleware, FnMiddleware, IntoSignal, Middleware,
    MiddlewareFn, Outcome,
};
pub use registry::{Config, Registry, RegistrationKey};
pub use request::{Exchange, RequestModel};
pub use signal::Signal;
