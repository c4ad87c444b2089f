//! Built-in health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from rotation. |
//!
//! ```rust
//! use lit::{App, health};
//!
//! let mut app = App::new();
//! app.get("/healthz", health::liveness);
//! app.get("/readyz", health::readiness);
//! ```
//!
//! Register your own readiness handler if it must gate on dependencies.

use crate::context::Context;
use crate::error::Result;

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(cx: &mut Context) -> Result {
    cx.text("ok")
}

/// `200 OK` with body `"ready"`.
pub async fn readiness(cx: &mut Context) -> Result {
    cx.text("ready")
}
