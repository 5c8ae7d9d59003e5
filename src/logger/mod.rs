//! Logger module
//!
//! Provides logging utilities for the framework including:
//! - Subscriber initialisation from configuration
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//!
//! Everything is emitted through `tracing`; access lines use the `access` target so they can
//! be filtered separately (`RUST_LOG=access=off`).

mod format;

pub use format::AccessLogEntry;

use crate::app::App;
use crate::config::LoggingConfig;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level`. Calling this again (or after another subscriber was
/// installed) is a no-op.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

pub fn log_server_start(addr: &SocketAddr, app: &App) {
    tracing::info!("======================================");
    tracing::info!("Listening on: http://{addr}");
    if app.static_enabled() {
        tracing::info!("Static files: {}", app.public_dir().display());
    } else {
        tracing::info!("Static files: disabled");
    }
    tracing::info!("Routes registered: {}", app.registry().len());
    tracing::info!("======================================");
}

pub fn log_server_stop(addr: &SocketAddr) {
    tracing::info!("Stopped accepting connections on {addr}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_request(method: &hyper::Method, path: &str) {
    tracing::debug!(%method, path, "dispatching request");
}

pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_handler_failure(method: &hyper::Method, path: &str, err: &anyhow::Error) {
    tracing::error!(%method, path, "Handler failed: {err:#}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}
