//! Built-in middleware.
//!
//! Middleware are ordinary [`Handler`](crate::Handler)s that call
//! [`Context::next`](crate::Context::next) to continue the chain:
//!
//! - [`trace`] — one `info` event per request with method, uri, status, latency
//! - [`Timeout`] — bounds the rest of the chain, `503` when the deadline passes

mod timeout;
mod trace;

pub use timeout::Timeout;
pub use trace::trace;
