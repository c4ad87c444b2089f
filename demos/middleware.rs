//! Chained handlers behind request tracing.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example middleware
//!
//! Try:
//!   curl -i http://localhost:8000/
//!   curl -i http://localhost:8000/admin/stats
//!   curl -i -H 'authorization: Bearer t' http://localhost:8000/admin/stats
//!   curl -i http://localhost:8000/slow

use std::time::Duration;

use lit::{App, Context, HttpError, Server, StatusCode, json, middleware};

#[tokio::main]
async fn main() -> Result<(), lit::Error> {
    tracing_subscriber::fmt::init();

    let mut app = App::new();
    // Added last, so trace wraps the timeout too.
    app.middleware(middleware::Timeout::new(Duration::from_secs(1)));
    app.middleware(middleware::trace);

    // First handler greets the log, second answers.
    app.get("/", first).then(second);
    app.get("/slow", slow);

    let mut admin = App::new();
    admin.middleware(require_auth);
    admin.get("/stats", stats);
    app.nest("/admin", admin);

    Server::bind("0.0.0.0:8000")?.serve(app).await
}

async fn first(cx: &mut Context) -> lit::Result {
    tracing::info!("first handler");
    cx.next().await
}

async fn second(cx: &mut Context) -> lit::Result {
    tracing::info!("second handler");
    cx.text("Hello World!")
}

async fn slow(cx: &mut Context) -> lit::Result {
    tokio::time::sleep(Duration::from_secs(5)).await;
    cx.text("too late")
}

async fn require_auth(cx: &mut Context) -> lit::Result {
    if cx.req.header("authorization").is_none() {
        return Err(HttpError::unauthorized().with_message("missing token").into());
    }
    cx.next().await
}

async fn stats(cx: &mut Context) -> lit::Result {
    cx.status(StatusCode::OK).json(&json!({ "requests": 42 }))
}
