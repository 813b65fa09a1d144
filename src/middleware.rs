//! Middleware trait and type erasure.
//!
//! # How async middleware is stored
//!
//! The registry needs to hold middleware of *different* types in one
//! insertion-ordered table. Rust collections can only hold one concrete
//! type, so we use **trait objects** (`dyn Middleware<R>`) to hide the
//! concrete type behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn audit(req: &mut Cx) { … }                ← user writes this
//!        ↓ registry.add("/api/(.*)", from_fn(audit), …)
//! FnMiddleware(audit)                               ← adapter over the fn item
//!        ↓  stored as BoxedMiddleware<Cx> = Arc<dyn Middleware<Cx>>
//! middleware.invoke(req)  at dispatch time          ← one vtable dispatch
//!        ↓
//! Box::pin(async { audit(req).await.into_signal() })  ← BoxFuture
//! ```
//!
//! Middleware borrows the request mutably for exactly the duration of one
//! invocation — the engine awaits each call to completion before issuing
//! the next, so exclusive access is enforced by the borrow checker instead
//! of a lock.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::signal::Signal;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future tied to the borrow it holds.
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// The `'a` is the middleware's borrow of the request model.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What one middleware invocation produces: an optional control signal
/// (`None` means "use the calling loop's continue default"), or a fault
/// that aborts the chain.
pub type Outcome = Result<Option<Signal>, Error>;

/// A heap-allocated, type-erased middleware shared across registrations.
///
/// `Arc` rather than `Box` because the same middleware value may be
/// registered under several routes, and a group payload hands out one
/// handle per member.
pub type BoxedMiddleware<R> = Arc<dyn Middleware<R>>;

/// The payload of one registration: a lone middleware, or an ordered group
/// run as its own sub-chain with array-scoped exit semantics.
pub(crate) enum Payload<R> {
    Single(BoxedMiddleware<R>),
    Group(Vec<BoxedMiddleware<R>>),
}

// ── Middleware trait ──────────────────────────────────────────────────────────

/// A unit of request processing.
///
/// Implement this directly when the middleware carries configuration:
///
/// ```rust
/// use strata::{BoxFuture, Middleware, Outcome, Signal};
///
/// struct RequireHeader { name: &'static str }
///
/// impl<R> Middleware<R> for RequireHeader
/// where
///     R: AsRef<http::HeaderMap> + Send + 'static,
/// {
///     fn invoke<'a>(&'a self, request: &'a mut R) -> BoxFuture<'a, Outcome> {
///         Box::pin(async move {
///             match (*request).as_ref().contains_key(self.name) {
///                 true  => Ok(None),
///                 false => Ok(Some(Signal::ExitArray)),
///             }
///         })
///     }
/// }
/// ```
///
/// For middleware without state, [`from_fn`] lifts a plain `async fn`.
pub trait Middleware<R>: Send + Sync {
    /// Runs this middleware against the request. The returned future is
    /// awaited to completion before the engine touches the request again.
    fn invoke<'a>(&'a self, request: &'a mut R) -> BoxFuture<'a, Outcome>;
}

// ── Return-type conversion ────────────────────────────────────────────────────

/// Conversion from a middleware's return value to an [`Outcome`].
///
/// Lets `async fn` middleware return whatever is natural:
/// - `()` — no signal; the calling loop continues
/// - [`Signal`] — an explicit signal
/// - `Option<Signal>` — the already-normalized form
/// - `Result<T, E>` where `T` is any of the above — a fallible middleware;
///   `Err` aborts the chain as [`Error::Handler`]
pub trait IntoSignal {
    fn into_signal(self) -> Outcome;
}

impl IntoSignal for () {
    fn into_signal(self) -> Outcome {
        Ok(None)
    }
}

impl IntoSignal for Signal {
    fn into_signal(self) -> Outcome {
        Ok(Some(self))
    }
}

impl IntoSignal for Option<Signal> {
    fn into_signal(self) -> Outcome {
        Ok(self)
    }
}

impl<T, E> IntoSignal for Result<T, E>
where
    T: IntoSignal,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn into_signal(self) -> Outcome {
        match self {
            Ok(value) => value.into_signal(),
            Err(e) => Err(Error::handler(e)),
        }
    }
}

// ── Function adapters ─────────────────────────────────────────────────────────

/// The calling contract of a function-style middleware, one lifetime at a
/// time.
///
/// This indirection exists because `async fn(&mut R) -> _` has a future
/// type that depends on the borrow's lifetime, which a plain
/// `Fn(&mut R) -> Fut` bound cannot express. You never name this trait
/// yourself — [`from_fn`] requires it `for<'a>`, and the blanket impl below
/// covers every qualifying function.
pub trait MiddlewareFn<'a, R: 'a>: Send + Sync {
    /// What the function returns once awaited.
    type Output: IntoSignal;
    /// The function's future, borrowing the request for `'a`.
    type Future: Future<Output = Self::Output> + Send + 'a;

    fn call(&self, request: &'a mut R) -> Self::Future;
}

impl<'a, R, F, Fut> MiddlewareFn<'a, R> for F
where
    R: 'a,
    F: Fn(&'a mut R) -> Fut + Send + Sync,
    Fut: Future + Send + 'a,
    Fut::Output: IntoSignal,
{
    type Output = Fut::Output;
    type Future = Fut;

    fn call(&self, request: &'a mut R) -> Fut {
        self(request)
    }
}

/// Newtype adapter that makes a plain async function a [`Middleware`].
pub struct FnMiddleware<F>(F);

/// Lifts `async fn(&mut R) -> impl IntoSignal` into a [`Middleware`].
///
/// ```rust
/// # struct Cx;
/// use strata::{from_fn, Signal};
///
/// async fn stop_group(_cx: &mut Cx) -> Signal {
///     Signal::ExitArray
/// }
///
/// let middleware = from_fn(stop_group);
/// # let _: strata::FnMiddleware<_> = middleware;
/// ```
pub fn from_fn<F>(f: F) -> FnMiddleware<F> {
    FnMiddleware(f)
}

impl<R, F> Middleware<R> for FnMiddleware<F>
where
    R: 'static,
    F: for<'a> MiddlewareFn<'a, R>,
{
    fn invoke<'a>(&'a self, request: &'a mut R) -> BoxFuture<'a, Outcome> {
        let fut = self.0.call(request);
        Box::pin(async move { fut.await.into_signal() })
    }
}

/// Erases a middleware into the shared handle group payloads are built
/// from.
///
/// ```rust,ignore
/// registry.add_group(
///     "/api/(.*)",
///     vec![boxed(from_fn(audit)), boxed(from_fn(authorize))],
///     Config::default().transparent(),
/// );
/// ```
pub fn boxed<R, M>(middleware: M) -> BoxedMiddleware<R>
where
    M: Middleware<R> + 'static,
{
    Arc::new(middleware)
}
