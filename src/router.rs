//! Finalized dispatch table.
//!
//! One radix tree per HTTP method, each leaf holding a fully composed chain.
//! A [`Router`] is produced once by [`App::into_router`](crate::App::into_router)
//! and is read-only afterwards, so concurrent requests share it through an
//! `Arc` without any locking.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_LENGTH, HeaderValue};
use http_body_util::Full;
use matchit::Router as MatchitRouter;

use crate::app::ErrorHandler;
use crate::chain::Chain;
use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::Method;

/// The immutable request dispatcher.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Chain>>,
    fallback: Chain,
    not_allowed: Chain,
    not_found: BoxedHandler,
    on_error: ErrorHandler,
}

enum Lookup {
    Found(Chain, HashMap<String, String>),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl Router {
    pub(crate) fn new(
        fallback: Chain,
        not_allowed: Chain,
        not_found: BoxedHandler,
        on_error: ErrorHandler,
    ) -> Self {
        Self { routes: HashMap::new(), fallback, not_allowed, not_found, on_error }
    }

    pub(crate) fn insert(&mut self, method: Method, path: &str, chain: Chain) -> Result<(), Error> {
        self.routes
            .entry(method)
            .or_insert_with(MatchitRouter::new)
            .insert(path, chain)
            .map_err(|source| Error::Route { method, path: path.to_owned(), source })
    }

    /// Matches `path` in the tree for `method`. `HEAD` falls back to the
    /// `GET` tree when no `HEAD` route matches.
    fn find(&self, method: Method, path: &str) -> Option<(Chain, HashMap<String, String>)> {
        let at = |m: Method| -> Option<(Chain, HashMap<String, String>)> {
            let matched = self.routes.get(&m)?.at(path).ok()?;
            let params = matched
                .params
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            Some((Arc::clone(matched.value), params))
        };
        match method {
            Method::Head => at(Method::Head).or_else(|| at(Method::Get)),
            m => at(m),
        }
    }

    fn lookup(&self, method: &http::Method, path: &str) -> Lookup {
        let found = Method::try_from(method).ok().and_then(|m| self.find(m, path));

        if let Some((chain, params)) = found {
            return Lookup::Found(chain, params);
        }

        let allowed: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|&m| self.find(m, path).is_some())
            .collect();

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allowed)
        }
    }

    /// Routes one request through its chain and produces the response.
    ///
    /// Never fails: handler errors go through the app's error handler, misses
    /// go through the not-found handler, and paths served under other methods
    /// answer `405` with an `Allow` header. `HEAD` requests to `GET` routes
    /// run the `GET` chain and get its headers with an empty body.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let head = req.method() == http::Method::HEAD;
        let lookup = self.lookup(req.method(), req.uri().path());

        let mut cx = match lookup {
            Lookup::Found(chain, params) => {
                Context::new(req, params, chain, Arc::clone(&self.not_found))
            }
            Lookup::MethodNotAllowed(allowed) => {
                let mut cx = Context::new(
                    req,
                    HashMap::new(),
                    Arc::clone(&self.not_allowed),
                    Arc::clone(&self.not_found),
                );
                let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    cx.res.set_header(ALLOW, value);
                }
                cx
            }
            Lookup::NotFound => Context::new(
                req,
                HashMap::new(),
                Arc::clone(&self.fallback),
                Arc::clone(&self.not_found),
            ),
        };

        if let Err(err) = cx.next().await {
            (self.on_error)(err, &mut cx);
        }

        let written = cx.res.bytes_written();
        let mut res = cx.res.into_http();
        if head {
            res.headers_mut().entry(CONTENT_LENGTH).or_insert(HeaderValue::from(written));
            *res.body_mut() = Full::new(Bytes::new());
        }
        res
    }
}
