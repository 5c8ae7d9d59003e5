// Connection handling module
// Serves one accepted TCP connection on its own task

use crate::app::App;
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body as _;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Serves HTTP/1.1 with keep-alive, dispatching every request through the app
/// 3. Writes an access log line per request when enabled
///
/// Connection-level failures are logged and end only this connection.
pub fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, app: Arc<App>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let app = Arc::clone(&app);
            async move {
                let started = Instant::now();
                let mut entry = app
                    .access_log()
                    .enabled
                    .then(|| AccessLogEntry::from_request(peer_addr, &req));

                let resp = app.respond(req).await;

                if let Some(entry) = entry.as_mut() {
                    let body_bytes = resp.body().size_hint().exact().unwrap_or(0);
                    entry.complete(resp.status().as_u16(), body_bytes, started.elapsed());
                    logger::log_access(entry, &app.access_log().format);
                }
                Ok::<_, Infallible>(resp)
            }
        });

        let conn = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(io, service);

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}
