//! Request-model contract and the exchange wrapper.
//!
//! The engine does not care what a request *is* — only that it can name a
//! path and a method. Anything implementing [`RequestModel`] can be driven
//! through a registry: the crate provides impls for [`http::Request`] (so
//! hyper- and axum-style requests plug in directly) and for [`Exchange`],
//! which carries an opaque response value alongside the request.

/// The two facts the engine needs about an incoming request.
pub trait RequestModel {
    /// The request target path. May still carry a `?query` or `#fragment`
    /// suffix — the engine strips both before any pattern sees the path.
    fn path(&self) -> &str;

    /// The method as an exact-case string, e.g. `"GET"`. Compared verbatim
    /// against registered method lists; no normalization.
    fn method(&self) -> &str;
}

/// Cuts the query string and fragment off a request target.
pub(crate) fn strip_target(target: &str) -> &str {
    match target.find(['?', '#']) {
        Some(end) => &target[..end],
        None => target,
    }
}

impl<B> RequestModel for http::Request<B> {
    fn path(&self) -> &str {
        self.uri().path()
    }

    fn method(&self) -> &str {
        self.method().as_str()
    }
}

// ── Exchange ──────────────────────────────────────────────────────────────────

/// A request paired with a mutable response value.
///
/// The engine never reads or writes the response — it is carried through
/// untouched so middleware can accumulate one. Handlers reach both halves
/// through the exchange:
///
/// ```rust
/// use strata::Exchange;
///
/// struct Reply { status: u16 }
///
/// async fn not_found(gate: &mut Exchange<http::Request<()>, Reply>) {
///     gate.response.status = 404;
/// }
/// ```
pub struct Exchange<Req, Res> {
    pub request: Req,
    pub response: Res,
}

impl<Req, Res> Exchange<Req, Res> {
    pub fn new(request: Req, response: Res) -> Self {
        Self { request, response }
    }
}

impl<Req: RequestModel, Res> RequestModel for Exchange<Req, Res> {
    fn path(&self) -> &str {
        self.request.path()
    }

    fn method(&self) -> &str {
        self.request.method()
    }
}
