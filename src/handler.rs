//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A chain mixes handlers of *different* types: plain `async fn`s, built-in
//! middleware structs, user structs holding configuration. They are stored
//! uniformly as trait objects (`Arc<dyn Handler>`).
//!
//! The path from user code to vtable call is:
//!
//! ```text
//! async fn hello(cx: &mut Context) -> Result { … }   ← user writes this
//!        ↓ app.get("/", hello)
//! Arc::new(hello) as BoxedHandler                   ← blanket impl via HandlerFn
//!        ↓  composed into Arc<[BoxedHandler]> at App::into_router
//! handler.call(&mut cx)  at request time            ← one vtable dispatch
//!        ↓
//! Box::pin(hello(cx))                               ← BoxFuture<'_, Result>
//! ```
//!
//! Handlers borrow the [`Context`] mutably for the duration of their future.
//! That borrow is what lets a middleware inspect `cx.res` after
//! `cx.next().await` returns.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;

/// A heap-allocated, type-erased future borrowing from `'a`.
///
/// `Send` lets hyper move request futures across worker threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A heap-allocated, type-erased handler shared by every request on a route.
pub(crate) type BoxedHandler = Arc<dyn Handler>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// A step in a request's chain: a route handler or a middleware.
///
/// Implemented automatically for every `async fn` with the signature
///
/// ```text
/// async fn name(cx: &mut Context) -> lit::Result
/// ```
///
/// Implement it by hand when the handler carries state:
///
/// ```rust
/// use lit::{BoxFuture, Context, Handler, HeaderValue};
///
/// struct PoweredBy(&'static str);
///
/// impl Handler for PoweredBy {
///     fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, lit::Result> {
///         Box::pin(async move {
///             cx.res.set_header("x-powered-by", HeaderValue::from_static(self.0));
///             cx.next().await
///         })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Result>;
}

/// Bridges `async fn(&mut Context)` to [`Handler`].
///
/// The future returned by such a function borrows the context, so its type
/// depends on the borrow's lifetime. This helper names that future per
/// lifetime, which is what lets the blanket impl below require
/// `for<'a> HandlerFn<'a>`.
#[doc(hidden)]
pub trait HandlerFn<'a>: Send + Sync {
    type Future: Future<Output = Result> + Send + 'a;

    fn invoke(&self, cx: &'a mut Context) -> Self::Future;
}

impl<'a, F, Fut> HandlerFn<'a> for F
where
    F: Fn(&'a mut Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result> + Send + 'a,
{
    type Future = Fut;

    fn invoke(&self, cx: &'a mut Context) -> Fut {
        self(cx)
    }
}

impl<F> Handler for F
where
    F: for<'a> HandlerFn<'a> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Result> {
        Box::pin(self.invoke(cx))
    }
}

pub(crate) fn boxed(handler: impl Handler) -> BoxedHandler {
    Arc::new(handler)
}
