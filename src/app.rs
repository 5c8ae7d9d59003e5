//! Application instance
//!
//! An `App` owns its route registry, dispatch settings and shutdown signal. Several apps can
//! live in one process, each serving its own listener.

use crate::config::{Cli, Config, LoggingConfig};
use crate::error::ServerError;
use crate::handler::dispatch::{self, DispatchSettings};
use crate::handler::HandlerConfig;
use crate::http::{normalize, Method, NormalizedResponse};
use crate::logger;
use crate::routing::RouteRegistry;
use crate::server;
use clap::Parser;
use http_body_util::Full;
use hyper::body::{Body as HttpBody, Bytes};
use hyper::Request;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::net::TcpListener;
use tokio::sync::Notify;

pub const DEFAULT_PORT: u16 = 8080;

/// Access-log switches applied by the connection layer
#[derive(Debug, Clone)]
pub struct AccessLogSettings {
    pub enabled: bool,
    pub format: String,
}

impl From<&LoggingConfig> for AccessLogSettings {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            enabled: logging.access_log,
            format: logging.access_log_format.clone(),
        }
    }
}

impl Default for AccessLogSettings {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

pub struct App {
    host: String,
    port: u16,
    registry: RouteRegistry,
    settings: DispatchSettings,
    access_log: AccessLogSettings,
    shutdown: Notify,
    closed: AtomicBool,
    local_addr: OnceLock<SocketAddr>,
}

impl App {
    /// App listening on `0.0.0.0:port` with static files served from `public`
    pub fn new(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
            registry: RouteRegistry::new(),
            settings: DispatchSettings::default(),
            access_log: AccessLogSettings::default(),
            shutdown: Notify::new(),
            closed: AtomicBool::new(false),
            local_addr: OnceLock::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut app = Self::new(config.server.port).with_static(
            config.static_files.enabled,
            config.static_files.root.clone(),
        );
        app.host.clone_from(&config.server.host);
        app.settings.max_body_size = config.http.max_body_size;
        app.access_log = AccessLogSettings::from(&config.logging);
        app
    }

    /// Toggle the static fallback and set its root directory
    #[must_use]
    pub fn with_static(mut self, enabled: bool, public_dir: impl Into<PathBuf>) -> Self {
        self.settings.static_enabled = enabled;
        self.settings.public_dir = public_dir.into();
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_access_log(mut self, access_log: AccessLogSettings) -> Self {
        self.access_log = access_log;
        self
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub const fn static_enabled(&self) -> bool {
        self.settings.static_enabled
    }

    pub fn public_dir(&self) -> &std::path::Path {
        &self.settings.public_dir
    }

    pub const fn access_log(&self) -> &AccessLogSettings {
        &self.access_log
    }

    pub const fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn register(&self, configs: impl IntoIterator<Item = HandlerConfig>) {
        self.registry.register(configs);
    }

    pub fn unregister(&self, pattern: &str, method: Method) {
        self.registry.unregister(pattern, method);
    }

    /// Run the full pipeline for one request and return the canonical response
    pub async fn handle_request<B>(&self, req: Request<B>) -> NormalizedResponse
    where
        B: HttpBody,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        normalize(dispatch::dispatch(&self.registry, &self.settings, req).await)
    }

    /// `handle_request` followed by conversion to a wire response
    pub async fn respond<B>(&self, req: Request<B>) -> hyper::Response<Full<Bytes>>
    where
        B: HttpBody,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.handle_request(req).await.into_http().await
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Address(format!("{}:{} ({e})", self.host, self.port)))
    }

    /// Bind the configured address
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.socket_addr()?;
        Ok(server::create_reusable_listener(addr)?)
    }

    /// Address actually being served, once `serve` has started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Accept connections until `close` is called
    pub async fn serve(self: &Arc<Self>, listener: TcpListener) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        // a second serve on the same app keeps the first address
        let _ = self.local_addr.set(addr);
        logger::log_server_start(&addr, self);

        loop {
            if self.closed.load(Ordering::Acquire) {
                break;
            }
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            server::handle_connection(stream, peer_addr, Arc::clone(self));
                        }
                        Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                    }
                }
                () = self.shutdown.notified() => break,
            }
        }

        logger::log_server_stop(&addr);
        Ok(())
    }

    /// `bind` then `serve`
    pub async fn listen(self: &Arc<Self>) -> Result<(), ServerError> {
        let listener = self.bind()?;
        self.serve(listener).await
    }

    /// Stop accepting connections; in-flight requests finish on their own
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.shutdown.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("settings", &self.settings)
            .field("routes", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Build an app from the command line and configuration, register `handlers`, and serve
/// until SIGINT/SIGTERM
///
/// Blocks the calling thread on a dedicated runtime, so call it from a plain `main`.
pub fn app(handlers: impl IntoIterator<Item = HandlerConfig>) -> Result<(), ServerError> {
    let cli = Cli::parse();
    let mut cfg = Config::load_from(&cli.config)?;
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    logger::init(&cfg.logging);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("Using {workers} worker threads"));
    }
    let runtime = runtime_builder.build()?;

    let app = Arc::new(App::from_config(&cfg));
    app.register(handlers);

    runtime.block_on(async move {
        server::signal::close_on_shutdown_signal(Arc::clone(&app));
        app.listen().await
    })
}
