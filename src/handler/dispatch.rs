//! Request dispatch module
//!
//! The single per-request control path: split the URL, resolve a route, gather parameters,
//! run the handler, and fall back to static files. Every failure along the way is turned
//! into an ordinary response here; nothing propagates to the serving loop.

use super::params::{parse_body, parse_url_search_params, ContentType};
use super::static_files;
use super::{HandlerResult, Params, RequestContext};
use crate::error::{ErrorCode, HandlerError};
use crate::http::{Method, Response};
use crate::logger;
use crate::routing::{match_route, RouteRegistry};
use futures::FutureExt;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body as HttpBody;
use hyper::header::CONTENT_TYPE;
use hyper::Request;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Dispatcher knobs taken from configuration
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub static_enabled: bool,
    pub public_dir: PathBuf,
    pub max_body_size: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            static_enabled: true,
            public_dir: PathBuf::from("public"),
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

/// Produce the raw response for one request
pub async fn dispatch<B>(
    registry: &RouteRegistry,
    settings: &DispatchSettings,
    req: Request<B>,
) -> Response
where
    B: HttpBody,
    B::Error: Into<BoxError>,
{
    let path = req.uri().path().to_string();
    let search = req
        .uri()
        .query()
        .filter(|q| !q.is_empty())
        .map(ToString::to_string);
    let method = req.method().clone();

    logger::log_request(&method, &path);

    let outcome = match respond_dynamic(registry, settings, &path, search.as_deref(), req).await {
        Ok(Some(res)) => Ok(res),
        Ok(None) => respond_fallback(settings, &path).await,
        Err(err) => Err(err),
    };

    outcome.unwrap_or_else(|err| error_response(&method, &path, err))
}

/// Try the registered routes; `Ok(None)` means no route matched
async fn respond_dynamic<B>(
    registry: &RouteRegistry,
    settings: &DispatchSettings,
    path: &str,
    search: Option<&str>,
    req: Request<B>,
) -> Result<Option<Response>, HandlerError>
where
    B: HttpBody,
    B::Error: Into<BoxError>,
{
    let Some(method) = Method::from_http(req.method()) else {
        return Ok(None);
    };

    let table = registry.lookup(method);
    let Some((route, mut params)) = match_route(path, &table) else {
        return Ok(None);
    };
    let handler = std::sync::Arc::clone(&route.handler);

    if method == Method::Get {
        if let Some(search) = search {
            params.merge(parse_url_search_params(search));
        }
    } else {
        params.merge(read_body_params(req, settings.max_body_size).await?);
    }

    let ctx = RequestContext {
        path: path.to_string(),
        method,
        params,
    };
    invoke(handler, ctx).await.map(Some)
}

/// Read the whole body and decode it according to `Content-Type`
async fn read_body_params<B>(req: Request<B>, limit: usize) -> Result<Params, ErrorCode>
where
    B: HttpBody,
    B::Error: Into<BoxError>,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or_else(ContentType::default, ContentType::parse);

    let bytes = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!("Request body exceeds {limit} bytes"));
            return Err(ErrorCode::BadRequest);
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return Err(ErrorCode::InternalServerError);
        }
    };

    parse_body(&content_type, &bytes)
}

/// Run a handler, converting a panic into a failure
async fn invoke(handler: super::Handler, ctx: RequestContext) -> HandlerResult {
    AssertUnwindSafe(async move { handler(ctx).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Err(HandlerError::Failed(anyhow::anyhow!(
                "handler panicked: {message}"
            )))
        })
}

/// Static files when enabled, otherwise (or when nothing resolves) 404
async fn respond_fallback(
    settings: &DispatchSettings,
    path: &str,
) -> Result<Response, HandlerError> {
    if settings.static_enabled {
        if let Some(res) = static_files::respond_static(&settings.public_dir, path).await {
            return Ok(res);
        }
    }
    Err(ErrorCode::NotFound.into())
}

/// Map a failure onto `(status, message)`
fn error_response(method: &hyper::Method, path: &str, err: HandlerError) -> Response {
    let code = match err {
        HandlerError::Code(code) => code,
        HandlerError::Failed(e) => {
            logger::log_handler_failure(method, path, &e);
            ErrorCode::InternalServerError
        }
    };
    Response::status_body(code.status(), code.message())
}
