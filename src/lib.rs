//! routekit - a small HTTP application framework on tokio and hyper
//!
//! Applications declare `(method, pattern, handler)` triples, hand them to [`app`] (or to an
//! [`App`] they drive themselves), and get:
//! - path matching with `:name` segment parameters
//! - query, form and JSON body parameters merged into one map
//! - loose response shapes normalized into status, headers and body
//! - a static file fallback rooted at `public`
//!
//! ```no_run
//! use routekit::{get, sync, Response};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     routekit::app([
//!         get("/hello", sync(|_| "hello world")),
//!         get("/error", sync(|_| Response::status_body(500, "an error has occured"))),
//!     ])?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use app::{app, App};
pub use error::{ErrorCode, HandlerError, ServerError};
pub use handler::{
    del, get, link, options, patch, post, put, sync, unlink, HandlerConfig, Params,
    RequestContext,
};
pub use http::{redirect, redirect_with, Body, Headers, Method, Response};
