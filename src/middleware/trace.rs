use std::time::Instant;

use tracing::{debug, info};

use crate::context::Context;
use crate::error::Result;

/// Logs every request that passes through it.
///
/// Register it after every other middleware so it runs outermost and its
/// latency covers the whole chain:
///
/// ```rust
/// let mut app = lit::App::new();
/// app.middleware(lit::middleware::trace);
/// ```
pub async fn trace(cx: &mut Context) -> Result {
    let start = Instant::now();
    let method = cx.req.method().clone();
    let uri = cx.req.uri().clone();

    debug!(%method, %uri, "request started");
    let result = cx.next().await;

    // The error handler has not run yet: failed requests still show the
    // status committed so far, so the failure is logged alongside it.
    info!(
        %method,
        %uri,
        status = cx.res.status().as_u16(),
        bytes = cx.res.bytes_written(),
        latency = ?start.elapsed(),
        failed = result.is_err(),
        "request completed",
    );
    result
}
