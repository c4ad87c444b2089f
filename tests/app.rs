//! Routing, body senders and error handling, driven through `Router::handle`.

use std::collections::BTreeMap;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use lit::{App, Context, HandlerError, HeaderValue, HttpError, Router, json};
use serde::Deserialize;
use serde_json::Value;

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    fn text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: &str) -> Reply {
    let req = http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::from(body.to_owned()))
        .unwrap();
    let (parts, body) = router.handle(req).await.into_parts();
    let body = body.collect().await.unwrap().to_bytes();
    Reply { status: parts.status, headers: parts.headers, body }
}

async fn get(router: &Router, uri: &str) -> Reply {
    send(router, "GET", uri, "").await
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn text(cx: &mut Context) -> lit::Result {
    cx.text("Hello World!")
}

async fn hello_json(cx: &mut Context) -> lit::Result {
    cx.json(&json!({ "message": "Hello World!" }))
}

async fn html(cx: &mut Context) -> lit::Result {
    cx.html("<h1>Hello World!</h1>")
}

async fn bad(_cx: &mut Context) -> lit::Result {
    Err(HttpError::bad_request().into())
}

async fn bad_with_message(_cx: &mut Context) -> lit::Result {
    Err(HttpError::bad_request().with_message("name is required").into())
}

async fn leaky(_cx: &mut Context) -> lit::Result {
    Err(HttpError::forbidden()
        .with_internal(std::io::Error::other("secret token abc123"))
        .into())
}

async fn plain_error(_cx: &mut Context) -> lit::Result {
    Err(HandlerError::msg("internal error: db password is hunter2"))
}

async fn io_error(_cx: &mut Context) -> lit::Result {
    std::fs::read("/definitely/not/here/lit")?;
    Ok(())
}

async fn created(cx: &mut Context) -> lit::Result {
    cx.status(StatusCode::CREATED).json(&json!({ "id": 99 }))
}

async fn user(cx: &mut Context) -> lit::Result {
    let id = cx.param("id").unwrap_or_default().to_owned();
    cx.json(&json!({ "id": id }))
}

#[derive(Deserialize)]
struct NewUser {
    name: String,
}

async fn create_user(cx: &mut Context) -> lit::Result {
    let input: NewUser = cx.bind()?;
    cx.status(StatusCode::CREATED).text(format!("created {}", input.name))
}

#[derive(Deserialize)]
struct Page {
    page: u32,
}

async fn search(cx: &mut Context) -> lit::Result {
    let page: Page = cx.query_as()?;
    let tags = cx.query().get_all("tag").collect::<Vec<_>>().join(",");
    cx.text(format!("page={} tags={tags}", page.page))
}

async fn root(cx: &mut Context) -> lit::Result {
    cx.text("root")
}

async fn moved(cx: &mut Context) -> lit::Result {
    cx.redirect(StatusCode::MOVED_PERMANENTLY, "/text")
}

async fn bad_redirect(cx: &mut Context) -> lit::Result {
    cx.redirect(StatusCode::OK, "/text")
}

async fn no_content(cx: &mut Context) -> lit::Result {
    cx.send_status(StatusCode::NO_CONTENT)
}

async fn explicit_not_found(cx: &mut Context) -> lit::Result {
    cx.not_found().await
}

async fn write_then_fail(cx: &mut Context) -> lit::Result {
    cx.text("partial")?;
    Err(HttpError::conflict().into())
}

async fn unencodable(cx: &mut Context) -> lit::Result {
    // JSON object keys must be strings.
    let scores = BTreeMap::from([(vec![1u8, 2], 3)]);
    cx.status(StatusCode::CREATED).json(&scores)
}

async fn json_over_text(cx: &mut Context) -> lit::Result {
    cx.res.set_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    cx.json(&json!({ "ok": true }))
}

fn app() -> Router {
    let mut app = App::new();
    app.get("/", root);
    app.get("/text", text);
    app.get("/json", hello_json);
    app.get("/html", html);
    app.get("/bad", bad);
    app.get("/bad/message", bad_with_message);
    app.get("/forbidden", leaky);
    app.get("/err", plain_error);
    app.get("/io", io_error);
    app.post("/created", created);
    app.get("/users/{id}", user);
    app.post("/users", create_user);
    app.delete("/users/{id}", no_content);
    app.get("/search", search);
    app.get("/old", moved);
    app.get("/bad-redirect", bad_redirect);
    app.get("/gone", explicit_not_found);
    app.get("/partial", write_then_fail);
    app.get("/unencodable", unencodable);
    app.get("/json-over-text", json_over_text);
    app.into_router().unwrap()
}

// ── Body senders ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn returns_text() {
    let res = get(&app(), "/text").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "Hello World!");
    assert!(res.headers[CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn returns_json() {
    let res = get(&app(), "/json").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[CONTENT_TYPE], "application/json");
    assert_eq!(res.json(), json!({ "message": "Hello World!" }));
}

#[tokio::test]
async fn returns_html() {
    let res = get(&app(), "/html").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "<h1>Hello World!</h1>");
    assert!(res.headers[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn staged_status_is_sent() {
    let res = send(&app(), "POST", "/created", "").await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json(), json!({ "id": 99 }));
}

#[tokio::test]
async fn send_status_has_empty_body() {
    let res = send(&app(), "DELETE", "/users/7", "").await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());
}

#[tokio::test]
async fn json_encode_failure_writes_nothing() {
    let res = get(&app(), "/unencodable").await;
    // The staged 201 was never committed, so the error handler answers.
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers[CONTENT_TYPE], "application/json");
    assert_eq!(res.body, r#"{"message":"Internal Server Error"}"#);
}

#[tokio::test]
async fn json_forces_its_content_type() {
    let res = get(&app(), "/json-over-text").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers.get_all(CONTENT_TYPE).iter().count(), 1);
    assert_eq!(res.headers[CONTENT_TYPE], "application/json");
    assert_eq!(res.json(), json!({ "ok": true }));
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn classified_error_uses_its_code_and_message() {
    let res = get(&app(), "/bad").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.headers[CONTENT_TYPE], "application/json");
    assert_eq!(res.json(), json!({ "message": "Bad Request" }));

    let res = get(&app(), "/bad/message").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "message": "name is required" }));
}

#[tokio::test]
async fn internal_cause_is_never_serialized() {
    let res = get(&app(), "/forbidden").await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json(), json!({ "message": "Forbidden" }));
    assert!(!res.text().contains("abc123"));
}

#[tokio::test]
async fn unclassified_errors_become_generic_500() {
    for uri in ["/err", "/io"] {
        let res = get(&app(), uri).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(res.json(), json!({ "message": "Internal Server Error" }), "{uri}");
    }
}

#[tokio::test]
async fn error_after_commit_keeps_first_status() {
    let res = get(&app(), "/partial").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(res.text(), "partial");
}

#[tokio::test]
async fn custom_error_handler_replaces_default() {
    let mut app = App::new();
    app.get("/bad", bad);
    app.error_handler(|err, cx| {
        let _ = cx.status(err.status()).text(format!("oops: {}", err.status().as_u16()));
    });
    let router = app.into_router().unwrap();

    let res = get(&router, "/bad").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.text(), "oops: 400");
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn path_params_are_exposed() {
    let res = get(&app(), "/users/42").await;
    assert_eq!(res.json(), json!({ "id": "42" }));
}

#[tokio::test]
async fn json_body_is_decoded() {
    let res = send(&app(), "POST", "/users", r#"{"name":"alice"}"#).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.text(), "created alice");

    let res = send(&app(), "POST", "/users", "{not json").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "message": "Bad Request" }));
}

#[tokio::test]
async fn query_is_decoded() {
    let res = get(&app(), "/search?page=2&tag=a&tag=b").await;
    assert_eq!(res.text(), "page=2 tags=a,b");

    let res = get(&app(), "/search?page=two").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn root_matches_only_the_root() {
    let router = app();
    assert_eq!(get(&router, "/").await.text(), "root");
    assert_eq!(get(&router, "/nope").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_path_is_404_json() {
    let res = get(&app(), "/missing").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({ "message": "Not Found" }));
}

#[tokio::test]
async fn wrong_method_is_405_with_allow() {
    let res = send(&app(), "PUT", "/users/1", "").await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers[ALLOW], "GET, HEAD, DELETE");

    let res = send(&app(), "PURGE", "/text", "").await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers[ALLOW], "GET, HEAD");

    let res = send(&app(), "HEAD", "/created", "").await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers[ALLOW], "POST");
}

#[tokio::test]
async fn head_is_served_by_get_routes_without_body() {
    let res = send(&app(), "HEAD", "/text", "").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(res.headers[CONTENT_LENGTH], "12");
    assert!(res.body.is_empty());

    let res = send(&app(), "HEAD", "/users/7", "").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.is_empty());
}

#[tokio::test]
async fn custom_not_found_handler() {
    async fn teapot(cx: &mut Context) -> lit::Result {
        cx.status(StatusCode::IM_A_TEAPOT).text("no such page")
    }

    let mut app = App::new();
    app.get("/gone", explicit_not_found);
    app.not_found(teapot);
    let router = app.into_router().unwrap();

    for uri in ["/gone", "/never-registered"] {
        let res = get(&router, uri).await;
        assert_eq!(res.status, StatusCode::IM_A_TEAPOT, "{uri}");
        assert_eq!(res.text(), "no such page", "{uri}");
    }
}

#[tokio::test]
async fn redirect_sets_location() {
    let res = get(&app(), "/old").await;
    assert_eq!(res.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers[LOCATION], "/text");

    let res = get(&app(), "/bad-redirect").await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn conflicting_routes_fail_to_build() {
    let mut app = App::new();
    app.get("/users/{id}", user);
    app.get("/users/{name}", user);
    let err = app.into_router().err().unwrap();
    assert!(matches!(err, lit::Error::Route { .. }));
    assert!(err.to_string().starts_with("invalid route `GET /users/{name}`"));
}

#[tokio::test]
async fn health_probes() {
    let mut app = App::new();
    app.get("/healthz", lit::health::liveness);
    app.get("/readyz", lit::health::readiness);
    let router = app.into_router().unwrap();

    assert_eq!(get(&router, "/healthz").await.text(), "ok");
    assert_eq!(get(&router, "/readyz").await.text(), "ready");
}
