//! Per-request context.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::chain::{Chain, Cursor};
use crate::error::Result;
use crate::handler::{BoxFuture, BoxedHandler};
use crate::http_error::HttpError;
use crate::request::{Query, Request};
use crate::response::{ContentType, Response};

/// Everything a handler sees for one request.
///
/// A fresh `Context` is built for every request and passed by `&mut` down the
/// chain. `req` and `res` are public fields so a middleware can read one while
/// writing the other.
pub struct Context {
    pub req: Request,
    pub res: Response,
    query: Query,
    cursor: Cursor,
    not_found: BoxedHandler,
}

/// `redirect` was given a status outside 3xx.
#[derive(Debug, thiserror::Error)]
#[error("invalid redirect status code {0}")]
pub struct InvalidRedirect(pub StatusCode);

impl Context {
    pub(crate) fn new(
        req: http::Request<Bytes>,
        params: HashMap<String, String>,
        chain: Chain,
        not_found: BoxedHandler,
    ) -> Self {
        let query = Query::parse(req.uri().query());
        Self {
            req: Request::new(req, params),
            res: Response::new(),
            query,
            cursor: Cursor::new(chain),
            not_found,
        }
    }

    // ── Chain control ─────────────────────────────────────────────────────────

    /// Runs the rest of the chain and returns its result.
    ///
    /// Not calling `next` stops the chain at the current handler. Calling it
    /// from the last handler fails with [`NextError::Exhausted`]; calling it
    /// twice from the same handler fails with [`NextError::AlreadyCalled`].
    ///
    /// [`NextError::Exhausted`]: crate::NextError::Exhausted
    /// [`NextError::AlreadyCalled`]: crate::NextError::AlreadyCalled
    pub fn next(&mut self) -> BoxFuture<'_, Result> {
        Box::pin(async move {
            let (caller, handler) = self.cursor.advance()?;
            let result = handler.call(self).await;
            self.cursor.rewind(caller);
            result
        })
    }

    /// Hands the request to the app's not-found handler.
    pub fn not_found(&mut self) -> BoxFuture<'_, Result> {
        let handler = Arc::clone(&self.not_found);
        Box::pin(async move { handler.call(self).await })
    }

    pub(crate) fn cursor_slot(&self) -> usize {
        self.cursor.current()
    }

    pub(crate) fn rewind_cursor(&mut self, slot: usize) {
        self.cursor.rewind(slot);
    }

    // ── Request accessors ─────────────────────────────────────────────────────

    pub fn path(&self) -> &str {
        self.req.path()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.req.param(name)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Decodes the query string into `T`; `400 Bad Request` when it does not fit.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_urlencoded::from_str(self.req.uri().query().unwrap_or_default())
            .map_err(|e| HttpError::bad_request().with_internal(e))
    }

    /// Decodes the JSON request body into `T`.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        self.req.json()
    }

    // ── Response senders ──────────────────────────────────────────────────────

    /// Starts a reply with an explicit status: `cx.status(StatusCode::CREATED).json(&user)`.
    pub fn status(&mut self, code: StatusCode) -> Reply<'_> {
        Reply { res: &mut self.res, status: Some(code) }
    }

    /// Starts a reply with the implicit `200 OK`.
    pub fn reply(&mut self) -> Reply<'_> {
        Reply { res: &mut self.res, status: None }
    }

    pub fn text(&mut self, body: impl AsRef<str>) -> Result {
        self.reply().text(body)
    }

    pub fn html(&mut self, body: impl AsRef<str>) -> Result {
        self.reply().html(body)
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result {
        self.reply().json(value)
    }

    /// Commits `code` with an empty body.
    pub fn send_status(&mut self, code: StatusCode) -> Result {
        self.status(code).no_body()
    }

    /// Redirects to `location` with a 3xx `code`.
    pub fn redirect(&mut self, code: StatusCode, location: &str) -> Result {
        if !code.is_redirection() {
            return Err(InvalidRedirect(code).into());
        }
        self.res.set_header(LOCATION, HeaderValue::try_from(location)?);
        self.res.write_header(code);
        Ok(())
    }
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// A pending reply: content type and body, with an optional staged status.
///
/// Obtain via [`Context::reply`] or [`Context::status`]. The content type is
/// set before the status is committed, so it always reaches the client.
pub struct Reply<'a> {
    res: &'a mut Response,
    status: Option<StatusCode>,
}

impl Reply<'_> {
    /// Terminate with raw bytes of the given content type.
    pub fn send(self, content_type: ContentType, body: &[u8]) -> Result {
        self.res.set_header(CONTENT_TYPE, content_type.header_value());
        if let Some(code) = self.status {
            self.res.write_header(code);
        }
        self.res.write(body);
        Ok(())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl AsRef<str>) -> Result {
        self.send(ContentType::Text, body.as_ref().as_bytes())
    }

    /// Terminate with an HTML body (`text/html; charset=utf-8`).
    pub fn html(self, body: impl AsRef<str>) -> Result {
        self.send(ContentType::Html, body.as_ref().as_bytes())
    }

    /// Terminate with a JSON body (`application/json`).
    ///
    /// `value` is serialized before anything is written: an encode failure
    /// leaves the response untouched.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result {
        let body = serde_json::to_vec(value)?;
        self.send(ContentType::Json, &body)
    }

    /// Terminate with no body. Commits `200 OK` when no status was staged.
    pub fn no_body(self) -> Result {
        self.res.write_header(self.status.unwrap_or(StatusCode::OK));
        Ok(())
    }
}
