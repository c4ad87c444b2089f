//! # lit
//!
//! A small HTTP framework with an explicit middleware chain.
//!
//! ## The model
//!
//! Every request gets one [`Context`]. Every route is a chain of
//! [`Handler`]s: the app's global middleware first (the last one registered
//! runs outermost), then the route's own handlers. A handler either answers,
//! fails, or hands control onwards with [`Context::next`]:
//!
//! ```text
//!   trace ──next()──▶ auth ──next()──▶ show_user
//!     ▲                 │
//!     │            Err(401) ── no next() ── show_user never runs
//!     └── result ◀──────┘
//! ```
//!
//! A handler's failure flows back up the chain to the app's error handler,
//! which answers classified [`HttpError`]s with their own status and
//! `{"message": …}`, and everything else with a bare `500`.
//!
//! What lit leaves to its collaborators:
//!
//! - **Path matching** — [`matchit`] radix trees, one per method
//! - **Connections, HTTP/1.1 and HTTP/2** — hyper
//! - **TLS, rate limiting, body-size limits** — the proxy in front of you
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use lit::{App, Context, HttpError, Server, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lit::Error> {
//!     let mut app = App::new();
//!     app.middleware(middleware::trace);
//!     app.get("/text", text);
//!     app.get("/bad", bad);
//!
//!     Server::bind("0.0.0.0:8000")?.serve(app).await
//! }
//!
//! async fn text(cx: &mut Context) -> lit::Result {
//!     cx.text("Hello World!")
//! }
//!
//! async fn bad(_cx: &mut Context) -> lit::Result {
//!     Err(HttpError::bad_request().into())
//! }
//! ```

mod app;
mod chain;
mod context;
mod error;
mod handler;
mod http_error;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use app::{App, ErrorHandler, Route, handle_error};
pub use chain::NextError;
pub use context::{Context, InvalidRedirect, Reply};
pub use error::{BoxError, Error, HandlerError, Result};
pub use handler::{BoxFuture, Handler};
pub use http_error::HttpError;
pub use method::Method;
pub use request::{Query, Request};
pub use response::{ContentType, Response};
pub use router::Router;
pub use server::Server;

pub use http::{HeaderValue, StatusCode};
pub use serde_json::json;
