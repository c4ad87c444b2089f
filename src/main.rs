//! Demo server.
//!
//! Run with:
//!   RUST_LOG=debug cargo run
//!
//! Environment:
//!   LIT_ADDR   listen address (default 0.0.0.0:8000)
//!   RUST_LOG   tracing filter (default info)
//!
//! Try:
//!   curl -i http://localhost:8000/json
//!   curl -i http://localhost:8000/bad
//!   curl -i http://localhost:8000/err

use lit::{App, Context, HttpError, Server, health, json, middleware};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> Result<(), lit::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = std::env::var("LIT_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());

    let mut app = App::new();
    app.middleware(middleware::trace);

    app.get("/", index);
    app.get("/text", text);
    app.get("/json", hello_json);
    app.get("/html", html);
    app.get("/bad", bad);
    app.get("/err", err);
    app.get("/healthz", health::liveness);
    app.get("/readyz", health::readiness);

    Server::bind(&addr)?.serve(app).await
}

async fn index(cx: &mut Context) -> lit::Result {
    cx.text("Hello World!")
}

async fn text(cx: &mut Context) -> lit::Result {
    cx.text("Hello World!")
}

async fn hello_json(cx: &mut Context) -> lit::Result {
    cx.json(&json!({ "message": "Hello World!" }))
}

async fn html(cx: &mut Context) -> lit::Result {
    cx.html("<h1>Hello World!</h1>")
}

// GET /bad → 400 {"message":"Bad Request"}
async fn bad(_cx: &mut Context) -> lit::Result {
    Err(HttpError::bad_request().into())
}

// GET /err → 500 {"message":"Internal Server Error"}; the text below is only logged.
async fn err(_cx: &mut Context) -> lit::Result {
    Err(lit::HandlerError::msg("internal error"))
}
