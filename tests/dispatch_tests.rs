//! End-to-end dispatch through `App::handle_request`, without a socket

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::Request;
use routekit::http::response::content_type;
use routekit::http::NormalizedResponse;
use routekit::{
    del, get, post, put, redirect, redirect_with, sync, App, ErrorCode, HandlerError, Headers, Method, Response,
};

fn app() -> App {
    App::new(0).with_static(false, "public")
}

fn request(method: &str, uri: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn request_with_body(method: &str, uri: &str, ct: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, ct)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn text(res: &NormalizedResponse) -> &str {
    res.text().unwrap()
}

fn echo_name() -> impl Fn(routekit::RequestContext) -> String + Send + Sync + 'static {
    |ctx| ctx.params.get_str("name").unwrap_or("-").to_string()
}

#[tokio::test]
async fn test_plain_string_response() {
    let app = app();
    app.register([get("/hello", sync(|_| "hello world"))]);

    let res = app.handle_request(request("GET", "/hello")).await;
    assert_eq!(res.status, 200);
    assert_eq!(text(&res), "hello world");
    assert_eq!(res.headers.get(CONTENT_LENGTH).unwrap(), "11");
}

#[tokio::test]
async fn test_status_and_body_tuple() {
    let app = app();
    app.register([get(
        "/error",
        sync(|_| Response::status_body(500, "an error has occured")),
    )]);

    let res = app.handle_request(request("GET", "/error")).await;
    assert_eq!(res.status, 500);
    assert_eq!(text(&res), "an error has occured");
}

#[tokio::test]
async fn test_status_only_has_empty_body() {
    let app = app();
    app.register([del("/item", sync(|_| 204u16))]);

    let res = app.handle_request(request("DELETE", "/item")).await;
    assert_eq!(res.status, 204);
    assert!(res.body.is_empty());
}

#[tokio::test]
async fn test_headers_are_sent() {
    let app = app();
    app.register([get(
        "/info",
        sync(|_| {
            Response::status_headers_body(
                201,
                Headers::new().with("Content-Type", "application/json"),
                r#"{"ok":true}"#,
            )
        }),
    )]);

    let res = app.handle_request(request("GET", "/info")).await;
    assert_eq!(res.status, 201);
    assert_eq!(content_type(&res), Some("application/json"));
    assert_eq!(text(&res), r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_path_parameter() {
    let app = app();
    app.register([get(
        "/users/:id",
        sync(|ctx| format!("user {}", ctx.params.get_str("id").unwrap_or_default())),
    )]);

    let res = app.handle_request(request("GET", "/users/42")).await;
    assert_eq!(text(&res), "user 42");

    let res = app.handle_request(request("GET", "/users/42/posts")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_multiple_path_parameters() {
    let app = app();
    app.register([get(
        "/users/:user/posts/:post",
        sync(|ctx| {
            format!(
                "{}:{}",
                ctx.params.get_str("user").unwrap_or_default(),
                ctx.params.get_str("post").unwrap_or_default()
            )
        }),
    )]);

    let res = app.handle_request(request("GET", "/users/ann/posts/7")).await;
    assert_eq!(text(&res), "ann:7");
}

#[tokio::test]
async fn test_query_string_on_get() {
    let app = app();
    app.register([get("/callName", sync(echo_name()))]);

    let res = app
        .handle_request(request("GET", "/callName?name=john+smith"))
        .await;
    assert_eq!(text(&res), "john smith");

    let res = app.handle_request(request("GET", "/callName")).await;
    assert_eq!(text(&res), "-");
}

#[tokio::test]
async fn test_json_body_on_post() {
    let app = app();
    app.register([post("/echo", sync(echo_name()))]);

    let res = app
        .handle_request(request_with_body(
            "POST",
            "/echo",
            "application/json",
            r#"{"name":"ada"}"#,
        ))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(text(&res), "ada");
}

#[tokio::test]
async fn test_json_with_charset_parameter() {
    let app = app();
    app.register([put("/echo", sync(echo_name()))]);

    let res = app
        .handle_request(request_with_body(
            "PUT",
            "/echo",
            "application/json; charset=UTF-8",
            r#"{"name":"grace"}"#,
        ))
        .await;
    assert_eq!(text(&res), "grace");
}

#[tokio::test]
async fn test_form_body() {
    let app = app();
    app.register([post("/form", sync(echo_name()))]);

    let res = app
        .handle_request(request_with_body(
            "POST",
            "/form",
            "application/x-www-form-urlencoded",
            "name=linus+t&x=1",
        ))
        .await;
    assert_eq!(text(&res), "linus t");
}

#[tokio::test]
async fn test_body_field_overrides_path_parameter() {
    let app = app();
    app.register([post(
        "/items/:id",
        sync(|ctx| ctx.params.get_str("id").unwrap_or_default().to_string()),
    )]);

    let res = app
        .handle_request(request_with_body(
            "POST",
            "/items/5",
            "application/json",
            r#"{"id":"from-body"}"#,
        ))
        .await;
    assert_eq!(text(&res), "from-body");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    app.register([post("/echo", sync(echo_name()))]);

    let res = app
        .handle_request(request_with_body(
            "POST",
            "/echo",
            "application/json",
            "{not json",
        ))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(text(&res), "bad request");
}

#[tokio::test]
async fn test_unknown_charset_is_bad_request() {
    let app = app();
    app.register([post("/echo", sync(echo_name()))]);

    let res = app
        .handle_request(request_with_body(
            "POST",
            "/echo",
            "application/json; charset=klingon",
            "{}",
        ))
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn test_not_found() {
    let app = app();
    let res = app.handle_request(request("GET", "/nothing")).await;
    assert_eq!(res.status, 404);
    assert_eq!(text(&res), "not found");
}

#[tokio::test]
async fn test_method_mismatch_is_not_found() {
    let app = app();
    app.register([get("/only-get", sync(|_| "get"))]);
    let res = app.handle_request(request("POST", "/only-get")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_redirect() {
    let app = app();
    app.register([
        get("/old", sync(|_| redirect_with("/new", 301))),
        get("/account", sync(|_| redirect("/login"))),
    ]);

    let res = app.handle_request(request("GET", "/old")).await;
    assert_eq!(res.status, 301);
    assert_eq!(res.headers.get(LOCATION).unwrap(), "/new");
    assert!(res.body.is_empty());

    let res = app.handle_request(request("GET", "/account")).await;
    assert_eq!(res.status, 302);
    assert_eq!(res.headers.get(LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_async_handler() {
    let app = app();
    app.register([get("/slow", |_| async {
        tokio::task::yield_now().await;
        "done"
    })]);

    let res = app.handle_request(request("GET", "/slow")).await;
    assert_eq!(text(&res), "done");
}

#[tokio::test]
async fn test_handler_error_codes() {
    let app = app();
    app.register([
        get(
            "/forbidden",
            sync(|_| Err::<String, _>(HandlerError::from(ErrorCode::Forbidden))),
        ),
        get(
            "/failed",
            sync(|_| Err::<String, _>(HandlerError::other(std::io::Error::other("disk gone")))),
        ),
    ]);

    let res = app.handle_request(request("GET", "/forbidden")).await;
    assert_eq!(res.status, 403);
    assert_eq!(text(&res), "forbidden");

    let res = app.handle_request(request("GET", "/failed")).await;
    assert_eq!(res.status, 500);
    assert_eq!(text(&res), "internal server error");
}

#[tokio::test]
async fn test_parameterized_route_shadows_literal() {
    let app = app();
    app.register([
        get("/users/me", sync(|_| "literal")),
        get("/users/:id", sync(|_| "param")),
    ]);

    let res = app.handle_request(request("GET", "/users/me")).await;
    assert_eq!(text(&res), "param");
}

#[tokio::test]
async fn test_unregister_is_idempotent() {
    let app = app();
    app.register([get("/gone", sync(|_| "here"))]);
    assert_eq!(
        app.handle_request(request("GET", "/gone")).await.status,
        200
    );

    app.unregister("/gone", Method::Get);
    app.unregister("/gone", Method::Get);
    assert_eq!(
        app.handle_request(request("GET", "/gone")).await.status,
        404
    );
}

#[tokio::test]
async fn test_reregister_replaces_handler() {
    let app = app();
    app.register([get("/v", sync(|_| "one"))]);
    app.register([get("/v", sync(|_| "two"))]);

    let res = app.handle_request(request("GET", "/v")).await;
    assert_eq!(text(&res), "two");
    assert_eq!(app.registry().len(), 1);
}

#[tokio::test]
async fn test_respond_produces_wire_response() {
    let app = app();
    app.register([get("/hello", sync(|_| "hello"))]);

    let res = app.respond(request("GET", "/hello")).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get(CONTENT_LENGTH).unwrap(), "5");
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"hello");
}
