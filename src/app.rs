//! Application builder.
//!
//! [`App`] collects routes, global middleware, and the error and not-found
//! handlers while the program starts up. [`App::into_router`] freezes all of
//! it into a [`Router`]; nothing about the configuration can change once
//! requests are flowing.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::chain::compose;
use crate::context::Context;
use crate::error::{Error, HandlerError, Result};
use crate::handler::{BoxedHandler, Handler, boxed};
use crate::http_error::HttpError;
use crate::method::Method;
use crate::router::Router;

/// Turns a handler failure into a response.
pub type ErrorHandler = Arc<dyn Fn(HandlerError, &mut Context) + Send + Sync + 'static>;

/// The application: routes, middleware, and failure handling.
///
/// ```rust,no_run
/// use lit::{App, Context, HttpError, Server, middleware};
///
/// #[tokio::main]
/// async fn main() -> Result<(), lit::Error> {
///     let mut app = App::new();
///     app.middleware(middleware::trace);
///     app.get("/users/{id}", get_user);
///     app.post("/users", authenticate).then(create_user);
///
///     Server::bind("0.0.0.0:3000")?.serve(app).await
/// }
///
/// async fn get_user(cx: &mut Context) -> lit::Result {
///     let id = cx.param("id").unwrap_or_default().to_owned();
///     cx.json(&lit::json!({ "id": id }))
/// }
///
/// async fn authenticate(cx: &mut Context) -> lit::Result {
///     if cx.req.header("authorization").is_none() {
///         return Err(HttpError::unauthorized().into());
///     }
///     cx.next().await
/// }
///
/// async fn create_user(cx: &mut Context) -> lit::Result {
///     cx.status(lit::StatusCode::CREATED).json(&lit::json!({ "id": 99 }))
/// }
/// ```
pub struct App {
    routes: Vec<Route>,
    middleware: Vec<BoxedHandler>,
    on_error: ErrorHandler,
    not_found: BoxedHandler,
}

/// A registered route. Returned by the registration methods so extra
/// handlers can be appended with [`then`](Route::then).
pub struct Route {
    method: Method,
    path: String,
    handlers: Vec<BoxedHandler>,
}

impl Route {
    /// Appends a handler that runs when the previous one calls `next`.
    pub fn then(&mut self, handler: impl Handler) -> &mut Self {
        self.handlers.push(boxed(handler));
        self
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            middleware: Vec::new(),
            on_error: Arc::new(handle_error),
            not_found: boxed(missing),
        }
    }

    /// Adds global middleware. Applies to every route, including routes
    /// registered before this call. Each call wraps the middleware added
    /// before it: the last middleware added runs first.
    pub fn middleware(&mut self, handler: impl Handler) -> &mut Self {
        self.middleware.push(boxed(handler));
        self
    }

    /// Replaces the error handler. The default is [`handle_error`].
    pub fn error_handler(
        &mut self,
        handler: impl Fn(HandlerError, &mut Context) + Send + Sync + 'static,
    ) -> &mut Self {
        self.on_error = Arc::new(handler);
        self
    }

    /// Replaces the handler run for unmatched paths and by
    /// [`Context::not_found`]. The default returns `404 Not Found`.
    pub fn not_found(&mut self, handler: impl Handler) -> &mut Self {
        self.not_found = boxed(handler);
        self
    }

    /// Registers `handler` for `method` + `path`.
    ///
    /// Paths are `matchit` patterns: `/users/{id}`, `/static/{*file}`. They
    /// match exactly, so `"/"` only ever matches the root.
    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> &mut Route {
        let idx = self.routes.len();
        self.routes.push(Route {
            method,
            path: path.to_owned(),
            handlers: vec![boxed(handler)],
        });
        &mut self.routes[idx]
    }

    pub fn get(&mut self, path: &str, handler: impl Handler) -> &mut Route {
        self.on(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler) -> &mut Route {
        self.on(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler) -> &mut Route {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler) -> &mut Route {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler) -> &mut Route {
        self.on(Method::Delete, path, handler)
    }

    /// Mounts every route of `child` under `prefix`.
    ///
    /// The child's middleware runs inside this app's middleware, and only for
    /// the child's routes, in the same last-added-outermost order. The child's
    /// error and not-found handlers are not used: a request has exactly one
    /// context and one error handler.
    pub fn nest(&mut self, prefix: &str, child: App) -> &mut Self {
        let prefix = prefix.trim_end_matches('/');
        for route in child.routes {
            let path = match route.path.as_str() {
                "/" if !prefix.is_empty() => prefix.to_owned(),
                p => format!("{prefix}{p}"),
            };
            let handlers = child
                .middleware
                .iter()
                .rev()
                .cloned()
                .chain(route.handlers)
                .collect();
            self.routes.push(Route { method: route.method, path, handlers });
        }
        self
    }

    /// Freezes the configuration into a [`Router`].
    ///
    /// Fails when a path is not a valid pattern or conflicts with another
    /// route registered for the same method.
    pub fn into_router(self) -> Result<Router, Error> {
        let fallback = compose(&self.middleware, std::slice::from_ref(&self.not_found));
        let not_allowed = compose(&self.middleware, &[boxed(method_not_allowed)]);

        let mut router = Router::new(fallback, not_allowed, self.not_found, self.on_error);
        for route in &self.routes {
            let chain = compose(&self.middleware, &route.handlers);
            debug!(
                method = %route.method,
                path = %route.path,
                handlers = chain.len(),
                "route registered",
            );
            router.insert(route.method, &route.path, chain)?;
        }
        Ok(router)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ── Default handlers ──────────────────────────────────────────────────────────

/// The default error handler.
///
/// Classified errors are answered with their own status and
/// `{"message": …}`. Anything else is logged and answered with a generic
/// `500 Internal Server Error`; its text never reaches the client.
///
/// When the response is already committed the error is only logged: the
/// status cannot change and the body already sent is left as is.
pub fn handle_error(err: HandlerError, cx: &mut Context) {
    let http = match err {
        HandlerError::Classified(http) => {
            if let Some(internal) = http.internal() {
                debug!(status = http.code().as_u16(), error = %internal, "request failed");
            }
            http
        }
        HandlerError::Unclassified(err) => {
            error!(method = %cx.req.method(), path = cx.path(), error = %err, "unhandled error");
            HttpError::internal_server_error()
        }
    };

    if cx.res.is_committed() {
        warn!(
            committed = cx.res.status().as_u16(),
            status = http.code().as_u16(),
            message = %http.message(),
            "error after response was committed",
        );
        return;
    }

    if let Err(e) = cx.status(http.code()).json(&http) {
        error!(error = %e, "failed to write error response");
    }
}

async fn missing(_cx: &mut Context) -> Result {
    Err(HttpError::not_found().into())
}

async fn method_not_allowed(_cx: &mut Context) -> Result {
    Err(HttpError::method_not_allowed().into())
}
