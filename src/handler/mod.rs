//! Request handler module
//!
//! Handler vocabulary (context, handler type, route declaration helpers) plus the
//! per-request dispatcher and the static file fallback.
//!
//! Every handler is asynchronous from the dispatcher's point of view. Synchronous closures
//! are adapted with [`sync`], which wraps their return value in an already-resolved future.
//!
//! ```
//! use routekit::handler::{get, post, sync};
//!
//! let routes = [
//!     get("/hello", sync(|_| "hello")),
//!     get("/users/:id", |ctx| async move {
//!         format!("user {}", ctx.params.get_str("id").unwrap_or_default())
//!     }),
//!     post("/echo", sync(|ctx| ctx.params.get_str("name").unwrap_or("anonymous").to_string())),
//! ];
//! assert_eq!(routes.len(), 3);
//! ```

pub mod dispatch;
pub mod params;
pub mod static_files;

use crate::error::HandlerError;
use crate::http::{Method, Response};
use crate::routing::RoutePattern;
use std::fmt;
use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::sync::Arc;

pub use params::Params;

/// Per-request data handed to a handler
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request path, without the query string
    pub path: String,
    pub method: Method,
    pub params: Params,
}

pub type HandlerResult = Result<Response, HandlerError>;
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;
pub type Handler = Arc<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>;

/// Values a handler may produce
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for Response {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoHandlerResult for &'static str {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Response::from(self))
    }
}

impl IntoHandlerResult for String {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Response::from(self))
    }
}

impl IntoHandlerResult for u16 {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Response::StatusOnly(self))
    }
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: Into<Response>,
    E: Into<HandlerError>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map(Into::into).map_err(Into::into)
    }
}

/// Erase an async function into a `Handler`
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoHandlerResult,
{
    Arc::new(move |ctx| -> HandlerFuture {
        let fut = f(ctx);
        Box::pin(async move { fut.await.into_handler_result() })
    })
}

/// Adapt a synchronous function to the async handler shape
pub fn sync<F, R>(f: F) -> impl Fn(RequestContext) -> Ready<R> + Send + Sync + 'static
where
    F: Fn(RequestContext) -> R + Send + Sync + 'static,
    R: IntoHandlerResult + Send + 'static,
{
    move |ctx| ready(f(ctx))
}

/// A (method, pattern, handler) triple awaiting registration
#[derive(Clone)]
pub struct HandlerConfig {
    pub method: Method,
    pub pattern: RoutePattern,
    pub handler: Handler,
}

impl HandlerConfig {
    pub fn new<F, Fut>(method: Method, pattern: &str, f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        Self {
            method,
            pattern: RoutePattern::new(pattern),
            handler: handler_fn(f),
        }
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

macro_rules! route_helpers {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<F, Fut>(pattern: &str, f: F) -> HandlerConfig
            where
                F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
                Fut: Future + Send + 'static,
                Fut::Output: IntoHandlerResult,
            {
                HandlerConfig::new(Method::$method, pattern, f)
            }
        )*
    };
}

route_helpers! {
    /// Declare a GET route
    get => Get;
    /// Declare a POST route
    post => Post;
    put => Put;
    patch => Patch;
    /// Declare a DELETE route
    del => Delete;
    options => Options;
    link => Link;
    unlink => Unlink;
}
