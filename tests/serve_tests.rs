//! Serving over a real loopback socket with hyper's HTTP/1 client

use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
use hyper::Request;
use hyper_util::rt::TokioIo;
use routekit::{get, post, sync, App};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

async fn start(app: App) -> (Arc<App>, SocketAddr, JoinHandle<()>) {
    let app = Arc::new(app.with_host("127.0.0.1").with_static(false, "public"));
    let listener = app.bind().unwrap();
    let addr = listener.local_addr().unwrap();
    let server = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.serve(listener).await.unwrap() })
    };
    (app, addr, server)
}

async fn send<B>(addr: SocketAddr, req: Request<B>) -> (u16, hyper::HeaderMap, String)
where
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(conn);

    let res = sender.send_request(req).await.unwrap();
    let status = res.status().as_u16();
    let headers = res.headers().clone();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn get_request(addr: SocketAddr, path: &str) -> Request<Empty<Bytes>> {
    Request::builder()
        .uri(path)
        .header(HOST, addr.to_string())
        .body(Empty::new())
        .unwrap()
}

#[tokio::test]
async fn test_get_over_socket() {
    let app = App::new(0);
    app.register([get(
        "/users/:id",
        sync(|ctx| format!("user {}", ctx.params.get_str("id").unwrap_or_default())),
    )]);
    let (app, addr, server) = start(app).await;

    let (status, headers, body) = send(addr, get_request(addr, "/users/9")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "user 9");
    assert_eq!(headers.get(CONTENT_LENGTH).unwrap(), "6");
    assert_eq!(app.local_addr(), Some(addr));

    app.close();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_post_json_over_socket() {
    let app = App::new(0);
    app.register([post(
        "/echo",
        sync(|ctx| ctx.params.get_str("msg").unwrap_or("-").to_string()),
    )]);
    let (app, addr, _server) = start(app).await;

    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(HOST, addr.to_string())
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from_static(br#"{"msg":"over the wire"}"#)))
        .unwrap();
    let (status, _, body) = send(addr, req).await;
    assert_eq!(status, 200);
    assert_eq!(body, "over the wire");

    app.close();
}

#[tokio::test]
async fn test_not_found_over_socket() {
    let (app, addr, _server) = start(App::new(0)).await;

    let (status, _, body) = send(addr, get_request(addr, "/missing")).await;
    assert_eq!(status, 404);
    assert_eq!(body, "not found");

    app.close();
}

#[tokio::test]
async fn test_panic_does_not_stop_serving() {
    let app = App::new(0);
    app.register([
        get("/boom", sync(|_| -> &'static str { panic!("boom") })),
        get("/fine", sync(|_| "fine")),
    ]);
    let (app, addr, _server) = start(app).await;

    let (status, _, body) = send(addr, get_request(addr, "/boom")).await;
    assert_eq!(status, 500);
    assert_eq!(body, "internal server error");

    let (status, _, body) = send(addr, get_request(addr, "/fine")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "fine");

    app.close();
}

#[tokio::test]
async fn test_two_apps_serve_independently() {
    let first = App::new(0);
    first.register([get("/who", sync(|_| "first"))]);
    let second = App::new(0);
    second.register([get("/who", sync(|_| "second"))]);

    let (first, first_addr, _s1) = start(first).await;
    let (second, second_addr, _s2) = start(second).await;

    let (_, _, body) = send(first_addr, get_request(first_addr, "/who")).await;
    assert_eq!(body, "first");
    let (_, _, body) = send(second_addr, get_request(second_addr, "/who")).await;
    assert_eq!(body, "second");

    first.close();
    second.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_handler_does_not_block_others() {
    let app = App::new(0);
    app.register([
        get("/slow", |_| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "slow"
        }),
        get("/fast", sync(|_| "fast")),
    ]);
    let (app, addr, _server) = start(app).await;

    let slow = tokio::spawn(send(addr, get_request(addr, "/slow")));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    let (status, _, body) = send(addr, get_request(addr, "/fast")).await;
    let elapsed = started.elapsed();
    assert_eq!(status, 200);
    assert_eq!(body, "fast");
    assert!(elapsed < Duration::from_secs(1), "fast request took {elapsed:?}");
    assert!(!slow.is_finished());

    let (status, _, body) = slow.await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body, "slow");

    app.close();
}

#[tokio::test]
async fn test_close_stops_running_server() {
    let app = App::new(0);
    app.register([get("/ping", sync(|_| "pong"))]);
    let (app, addr, server) = start(app).await;

    let (_, _, body) = send(addr, get_request(addr, "/ping")).await;
    assert_eq!(body, "pong");
    assert!(!server.is_finished());

    app.close();
    let joined = tokio::time::timeout(Duration::from_secs(1), server).await;
    assert!(joined.is_ok(), "accept loop still running after close");
    joined.unwrap().unwrap();
    assert!(app.is_closed());
}
