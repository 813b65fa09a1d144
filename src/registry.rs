//! Insertion-ordered route registry.
//!
//! One [`Registry`] serves exactly one request: populate it with `add` /
//! `add_group` calls, then consume it with [`Registry::execute`]. The
//! borrow rules make the lifecycle explicit — `execute` takes the registry
//! by value, so registering after dispatch has begun is unrepresentable.
//!
//! Entries are kept in registration order and walked in that order at
//! dispatch time. Re-registering a key replaces the entry in place; its
//! position in the walk does not change.

use std::sync::Arc;

use tracing::warn;

use crate::chain::{drive, Chain};
use crate::error::Error;
use crate::matcher::{PathMatcher, RegexMatcher, RoutePredicate};
use crate::middleware::{BoxedMiddleware, Middleware, Payload};
use crate::request::{strip_target, RequestModel};

// ── RegistrationKey ───────────────────────────────────────────────────────────

/// The composite key identifying one registration slot: route pattern plus
/// optional method list.
///
/// Keys are compared by value. The method list is sorted on construction,
/// so `["GET", "POST"]` and `["POST", "GET"]` claim the same slot — method
/// order never affects matching, only which strings are present. The same
/// route with a different method list is a distinct slot.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RegistrationKey {
    route: String,
    methods: Option<Vec<String>>,
}

impl RegistrationKey {
    pub(crate) fn new(route: &str, methods: Option<&[String]>) -> Self {
        let methods = methods.map(|m| {
            let mut sorted = m.to_vec();
            sorted.sort();
            sorted
        });
        Self { route: route.to_owned(), methods }
    }

    /// The route pattern as registered.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The method list in key (sorted) order, if the registration was
    /// method-scoped.
    pub fn methods(&self) -> Option<&[String]> {
        self.methods.as_deref()
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

/// Per-registration options.
///
/// ```rust
/// use strata::Config;
///
/// let config = Config::default().methods(["GET", "HEAD"]).transparent();
/// ```
#[derive(Clone, Debug, Default)]
pub struct Config {
    methods: Option<Vec<String>>,
    transparent: bool,
    debug: bool,
}

impl Config {
    /// Restricts the registration to the given methods. Strings are kept
    /// and compared verbatim — `"get"` does not match a `GET` request.
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    /// Lets the chain walk continue past this entry when it matches.
    /// Without this, a match on the entry is the chain's last.
    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    /// Suppresses the duplicate-registration warning for this `add`.
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

// ── Entry ─────────────────────────────────────────────────────────────────────

/// One registered slot: payload plus everything needed to decide a match.
pub(crate) struct Entry<R> {
    pub(crate) payload: Payload<R>,
    pub(crate) predicate: RoutePredicate,
    pub(crate) methods: Option<Vec<String>>,
    pub(crate) transparent: bool,
}

impl<R> Entry<R> {
    /// Does this entry match the (already stripped) path and method?
    pub(crate) fn accepts(&self, path: &str, method: &str) -> bool {
        (self.predicate)(path)
            && self
                .methods
                .as_ref()
                .map_or(true, |m| m.iter().any(|allowed| allowed == method))
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The middleware registry for a single request.
///
/// See the crate-level docs for the full dispatch model. In short: entries
/// are walked in registration order; a matching transparent entry runs and
/// the walk continues; the first matching non-transparent entry runs and
/// ends the chain.
pub struct Registry<R> {
    request: R,
    entries: Vec<(RegistrationKey, Entry<R>)>,
    matcher: Box<dyn PathMatcher>,
}

impl<R: RequestModel> Registry<R> {
    /// Creates a registry for `request` using the default
    /// [`RegexMatcher`].
    pub fn new(request: R) -> Self {
        Self::with_matcher(request, RegexMatcher)
    }

    /// Creates a registry with a caller-supplied [`PathMatcher`].
    pub fn with_matcher(request: R, matcher: impl PathMatcher + 'static) -> Self {
        Self { request, entries: Vec::new(), matcher: Box::new(matcher) }
    }

    /// Registers a single middleware for `route`.
    ///
    /// Re-registering an existing (route, methods) key replaces the entry
    /// in place and logs a warning unless [`Config::debug`] is set.
    ///
    /// # Panics
    ///
    /// Panics if the matcher rejects `route` — an invalid pattern is a
    /// programmer error, caught at registration rather than at dispatch.
    pub fn add(&mut self, route: &str, middleware: impl Middleware<R> + 'static, config: Config) {
        self.insert(route, Payload::Single(Arc::new(middleware)), config);
    }

    /// Registers an ordered group of middleware for `route`, run as its
    /// own sub-chain: a member returning
    /// [`Signal::ExitArray`](crate::Signal::ExitArray) skips the rest of
    /// the group, and only the group.
    ///
    /// # Panics
    ///
    /// Panics if the matcher rejects `route`, as [`Registry::add`] does.
    pub fn add_group(&mut self, route: &str, members: Vec<BoxedMiddleware<R>>, config: Config) {
        self.insert(route, Payload::Group(members), config);
    }

    fn insert(&mut self, route: &str, payload: Payload<R>, config: Config) {
        let Config { methods, transparent, debug } = config;
        let key = RegistrationKey::new(route, methods.as_deref());
        let predicate = self.matcher.compile(route).unwrap_or_else(|e| panic!("{e}"));
        let entry = Entry { payload, predicate, methods, transparent };

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => {
                if !debug {
                    warn!(
                        route = %key.route(),
                        methods = ?key.methods(),
                        "duplicate registration replaces earlier entry"
                    );
                }
                *slot = entry;
            }
            None => self.entries.push((key, entry)),
        }
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registration keys in walk order.
    pub fn keys(&self) -> impl Iterator<Item = &RegistrationKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// The request this registry was built for.
    pub fn request(&self) -> &R {
        &self.request
    }

    /// Runs the chain and resolves once it reaches its end-of-chain
    /// sentinel, returning the request model with whatever side effects
    /// the middleware left on it.
    ///
    /// Consumes the registry: one registry instance serves one request.
    /// The first middleware fault aborts the remaining chain and surfaces
    /// as [`Error::Handler`].
    pub async fn execute(mut self) -> Result<R, Error> {
        let path = strip_target(self.request.path()).to_owned();
        let method = self.request.method().to_owned();
        let chain = Chain::compose(&self.entries, &path, &method);
        drive(chain, &mut self.request).await?;
        Ok(self.request)
    }
}
