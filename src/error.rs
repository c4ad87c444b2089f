//! Error types.
//!
//! Two families live here and they never mix:
//!
//! - [`Error`] — infrastructure failures surfaced by [`Server`](crate::Server)
//!   and [`App::into_router`](crate::App::into_router): binding a port, parsing
//!   an address, inserting an invalid route pattern.
//! - [`HandlerError`] — what a handler returns. It is classified exactly once,
//!   when the failure is converted with `?`, so the error handler can answer
//!   without inspecting types.

use std::fmt;
use std::net::AddrParseError;

use crate::http_error::HttpError;
use crate::method::Method;

/// A boxed, thread-safe error value.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result type of every handler and middleware.
pub type Result<T = (), E = HandlerError> = std::result::Result<T, E>;

/// The error type returned by lit's fallible setup and serving operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid route `{method} {path}`: {source}")]
    Route {
        method: Method,
        path: String,
        #[source]
        source: matchit::InsertError,
    },
}

// ── HandlerError ──────────────────────────────────────────────────────────────

/// A failure returned from a handler.
///
/// Any `std::error::Error` converts into a `HandlerError` through `?`. The
/// conversion walks the error's `source()` chain: if an [`HttpError`] is found
/// anywhere in it, the innermost one becomes [`HandlerError::Classified`];
/// everything else is [`HandlerError::Unclassified`].
///
/// ```rust
/// use lit::{HandlerError, HttpError, StatusCode};
///
/// let err = HandlerError::from(HttpError::bad_request());
/// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
///
/// let err = HandlerError::msg("database unreachable");
/// assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
pub enum HandlerError {
    /// Carries a client-facing status and message.
    Classified(HttpError),
    /// Anything else. Logged server-side, answered with a generic 500.
    Unclassified(BoxError),
}

impl HandlerError {
    /// An unclassified error from a plain message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::Unclassified(message.to_string().into())
    }

    /// The status this error is answered with.
    pub fn status(&self) -> http::StatusCode {
        match self {
            Self::Classified(e) => e.code(),
            Self::Unclassified(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Classified(_))
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        let err: BoxError = Box::new(err);
        match innermost_http_error(&*err) {
            Some(http) => Self::Classified(http),
            None => Self::Unclassified(err),
        }
    }
}

/// Walks the `source()` chain and returns the deepest [`HttpError`] in it.
fn innermost_http_error(err: &(dyn std::error::Error + 'static)) -> Option<HttpError> {
    let mut found = None;
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(http) = e.downcast_ref::<HttpError>() {
            found = Some(http);
        }
        current = e.source();
    }
    found.cloned()
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classified(e) => f.debug_tuple("Classified").field(e).finish(),
            Self::Unclassified(e) => f.debug_tuple("Unclassified").field(e).finish(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classified(e) => fmt::Display::fmt(e, f),
            Self::Unclassified(e) => fmt::Display::fmt(e, f),
        }
    }
}
