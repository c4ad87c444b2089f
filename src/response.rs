//! Outgoing response with single-commit semantics.
//!
//! Handlers never build a transport response themselves. They write into the
//! [`Response`] held by their [`Context`](crate::Context), which behaves like
//! a streaming writer:
//!
//! ```text
//!  Fresh ──write_header(code)──▶ Committed(code)
//!    │                               ▲
//!    └────────write(bytes)───────────┘   (implicit 200)
//! ```
//!
//! Once committed, status and header changes are ignored with a `warn` log.
//! Body writes keep being accepted and counted.

use bytes::Bytes;
use http::StatusCode;
use http::header::{HeaderMap, HeaderValue, IntoHeaderName};
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for [`Reply::send`](crate::Reply::send).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,         // text/csv
    Html,        // text/html; charset=utf-8
    Json,        // application/json
    OctetStream, // application/octet-stream
    Text,        // text/plain; charset=utf-8
    Xml,         // application/xml
}

impl ContentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }

    pub(crate) fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// The response being written for the current request.
#[derive(Debug, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    committed: bool,
    written: usize,
}

impl Response {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Commits `code` as the response status.
    ///
    /// Only the first call (or the implicit commit from the first body write)
    /// takes effect; later calls are logged and ignored.
    pub fn write_header(&mut self, code: StatusCode) {
        if self.committed {
            warn!(
                status = self.status.as_u16(),
                ignored = code.as_u16(),
                "superfluous write_header call on committed response",
            );
            return;
        }
        self.status = code;
        self.committed = true;
    }

    /// Appends `buf` to the body, committing `200 OK` first if nothing was
    /// committed yet. Returns the number of bytes written.
    pub fn write(&mut self, buf: &[u8]) -> usize {
        if !self.committed {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        self.written += buf.len();
        buf.len()
    }

    /// Sets a header, replacing any previous value. Ignored once committed.
    pub fn set_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        if self.guard_headers() {
            self.headers.insert(name, value);
        }
    }

    /// Adds a header value without replacing existing ones. Ignored once committed.
    pub fn append_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        if self.guard_headers() {
            self.headers.append(name, value);
        }
    }

    fn guard_headers(&self) -> bool {
        if self.committed {
            warn!(status = self.status.as_u16(), "header change on committed response ignored");
        }
        !self.committed
    }

    /// The committed status, or `200 OK` while still fresh.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Total body bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

/// Lets handlers stream formatted output: `write!(cx.res, "{n} items")`.
impl std::io::Write for Response {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(Response::write(self, buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
