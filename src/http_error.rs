//! Classified HTTP errors.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// An error that carries its own client-facing status and message.
///
/// Only `message` is serialized: the wire body is always
/// `{"message": <string or structured value>}`. The internal cause is kept
/// for server-side diagnostics and exposed through
/// [`source()`](std::error::Error::source).
///
/// ```rust
/// use lit::{HttpError, StatusCode, json};
///
/// let e = HttpError::bad_request();
/// assert_eq!(e.code(), StatusCode::BAD_REQUEST);
/// assert_eq!(e.message(), "Bad Request");
///
/// let e = HttpError::new(StatusCode::UNPROCESSABLE_ENTITY)
///     .with_message(json!({ "field": "email", "reason": "missing" }));
/// assert_eq!(e.message()["field"], "email");
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct HttpError {
    #[serde(skip)]
    code: StatusCode,
    message: Value,
    #[serde(skip)]
    internal: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HttpError {
    /// An error for `code` with the standard reason phrase as its message.
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            message: Value::String(code.canonical_reason().unwrap_or_default().to_owned()),
            internal: None,
        }
    }

    /// Replaces the message. Strings and `serde_json::Value`s both work.
    pub fn with_message(mut self, message: impl Into<Value>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches the underlying cause. It is logged, never sent to the client.
    pub fn with_internal(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.internal = Some(Arc::new(cause));
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &Value {
        &self.message
    }

    pub fn internal(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.internal.as_deref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {}, message: {}", self.code.as_u16(), self.message)?;
        if let Some(internal) = &self.internal {
            write!(f, ", internal: {internal}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.internal.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<StatusCode> for HttpError {
    fn from(code: StatusCode) -> Self {
        Self::new(code)
    }
}

// ── Shorthands ────────────────────────────────────────────────────────────────

macro_rules! shorthands {
    ($($name:ident => $code:ident),* $(,)?) => {
        impl HttpError {
            $(
                #[doc = concat!("`", stringify!($code), "` with the standard reason phrase.")]
                pub fn $name() -> Self {
                    Self::new(StatusCode::$code)
                }
            )*
        }
    };
}

shorthands! {
    // 4xx
    bad_request                     => BAD_REQUEST,
    unauthorized                    => UNAUTHORIZED,
    payment_required                => PAYMENT_REQUIRED,
    forbidden                       => FORBIDDEN,
    not_found                       => NOT_FOUND,
    method_not_allowed              => METHOD_NOT_ALLOWED,
    not_acceptable                  => NOT_ACCEPTABLE,
    proxy_authentication_required   => PROXY_AUTHENTICATION_REQUIRED,
    request_timeout                 => REQUEST_TIMEOUT,
    conflict                        => CONFLICT,
    gone                            => GONE,
    length_required                 => LENGTH_REQUIRED,
    precondition_failed             => PRECONDITION_FAILED,
    payload_too_large               => PAYLOAD_TOO_LARGE,
    uri_too_long                    => URI_TOO_LONG,
    unsupported_media_type          => UNSUPPORTED_MEDIA_TYPE,
    range_not_satisfiable           => RANGE_NOT_SATISFIABLE,
    expectation_failed              => EXPECTATION_FAILED,
    im_a_teapot                     => IM_A_TEAPOT,
    misdirected_request             => MISDIRECTED_REQUEST,
    unprocessable_entity            => UNPROCESSABLE_ENTITY,
    locked                          => LOCKED,
    failed_dependency               => FAILED_DEPENDENCY,
    upgrade_required                => UPGRADE_REQUIRED,
    precondition_required           => PRECONDITION_REQUIRED,
    too_many_requests               => TOO_MANY_REQUESTS,
    request_header_fields_too_large => REQUEST_HEADER_FIELDS_TOO_LARGE,
    unavailable_for_legal_reasons   => UNAVAILABLE_FOR_LEGAL_REASONS,
    // 5xx
    internal_server_error           => INTERNAL_SERVER_ERROR,
    not_implemented                 => NOT_IMPLEMENTED,
    bad_gateway                     => BAD_GATEWAY,
    service_unavailable             => SERVICE_UNAVAILABLE,
    gateway_timeout                 => GATEWAY_TIMEOUT,
    http_version_not_supported      => HTTP_VERSION_NOT_SUPPORTED,
    variant_also_negotiates         => VARIANT_ALSO_NEGOTIATES,
    insufficient_storage            => INSUFFICIENT_STORAGE,
    loop_detected                   => LOOP_DETECTED,
    not_extended                    => NOT_EXTENDED,
    network_authentication_required => NETWORK_AUTHENTICATION_REQUIRED,
}
