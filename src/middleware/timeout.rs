use std::time::Duration;

use tracing::warn;

use crate::context::Context;
use crate::error::Result;
use crate::handler::{BoxFuture, Handler};
use crate::http_error::HttpError;

/// Bounds the rest of the chain by a deadline.
///
/// When the deadline passes, the downstream future is dropped and the request
/// fails with `503 Service Unavailable`. Whatever the dropped handlers already
/// committed to the response stays committed.
///
/// ```rust
/// use std::time::Duration;
/// use lit::middleware::Timeout;
///
/// let mut app = lit::App::new();
/// app.middleware(Timeout::new(Duration::from_secs(10)));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
    duration: Duration,
}

impl Timeout {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Handler for Timeout {
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Result> {
        Box::pin(async move {
            let slot = cx.cursor_slot();
            let outcome = tokio::time::timeout(self.duration, cx.next()).await;
            match outcome {
                Ok(result) => result,
                Err(elapsed) => {
                    // The dropped future never rewound the cursor.
                    cx.rewind_cursor(slot);
                    warn!(path = cx.path(), timeout = ?self.duration, "request deadline exceeded");
                    Err(HttpError::service_unavailable().with_internal(elapsed).into())
                }
            }
        })
    }
}
