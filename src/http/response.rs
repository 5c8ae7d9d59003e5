//! Handler response shapes and their normalization
//!
//! A handler answers with one of four shapes. `normalize` turns any of them into a canonical
//! status, header map and body; `NormalizedResponse::into_http` produces the wire response.

use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::StatusCode;
use std::collections::BTreeMap;
use tokio::io::AsyncReadExt;

/// Response headers supplied by a handler
///
/// Keys are unique; inserting an existing key replaces its value. Values may be given as
/// anything displayable, so numbers work as well as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.insert(name.into(), value.to_string());
    }

    /// Builder form of `insert`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Headers {
    fn from(pairs: [(K, V); N]) -> Self {
        let mut headers = Self::new();
        for (k, v) in pairs {
            headers.insert(k, v);
        }
        headers
    }
}

/// An opened file whose length is known up front
#[derive(Debug)]
pub struct FileBody {
    file: tokio::fs::File,
    len: u64,
}

impl FileBody {
    pub const fn new(file: tokio::fs::File, len: u64) -> Self {
        Self { file, len }
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the file into memory, stopping at the length it was opened with
    pub async fn read_all(mut self) -> std::io::Result<Bytes> {
        let mut buf = Vec::with_capacity(usize::try_from(self.len).unwrap_or(0));
        (&mut self.file).take(self.len).read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }
}

/// Response body: text, raw bytes, or a file handle read when the response is written
#[derive(Debug)]
pub enum Body {
    Text(String),
    Bytes(Bytes),
    File(FileBody),
}

impl Default for Body {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(v))
    }
}

impl From<FileBody> for Body {
    fn from(f: FileBody) -> Self {
        Self::File(f)
    }
}

/// What a handler returns
#[derive(Debug)]
pub enum Response {
    StatusHeadersBody(u16, Headers, Body),
    StatusBody(u16, Body),
    StatusOnly(u16),
    BodyOnly(Body),
}

impl Response {
    pub fn status_headers_body(status: u16, headers: impl Into<Headers>, body: impl Into<Body>) -> Self {
        Self::StatusHeadersBody(status, headers.into(), body.into())
    }

    pub fn status_body(status: u16, body: impl Into<Body>) -> Self {
        Self::StatusBody(status, body.into())
    }

    pub const fn status(status: u16) -> Self {
        Self::StatusOnly(status)
    }

    pub fn body(body: impl Into<Body>) -> Self {
        Self::BodyOnly(body.into())
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::BodyOnly(Body::default())
    }
}

impl From<&str> for Response {
    fn from(s: &str) -> Self {
        Self::body(s)
    }
}

impl From<String> for Response {
    fn from(s: String) -> Self {
        Self::body(s)
    }
}

impl From<Bytes> for Response {
    fn from(b: Bytes) -> Self {
        Self::body(b)
    }
}

impl From<u16> for Response {
    fn from(status: u16) -> Self {
        Self::StatusOnly(status)
    }
}

pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// Temporary (302) redirect to `path`
pub fn redirect(path: &str) -> Response {
    redirect_with(path, DEFAULT_REDIRECT_STATUS)
}

/// Redirect to `path` with an explicit status, e.g. 301 or 307
pub fn redirect_with(path: &str, code: u16) -> Response {
    Response::StatusHeadersBody(code, Headers::new().with("location", path), Body::default())
}

/// Canonical body after normalization
#[derive(Debug)]
pub enum NormalizedBody {
    Bytes(Bytes),
    File(FileBody),
}

impl NormalizedBody {
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(b) => b.len() as u64,
            Self::File(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical status/headers/body triple
#[derive(Debug)]
pub struct NormalizedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: NormalizedBody,
}

impl NormalizedResponse {
    /// Body as text; `None` for file bodies or non-UTF-8 bytes
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            NormalizedBody::Bytes(b) => std::str::from_utf8(b).ok(),
            NormalizedBody::File(_) => None,
        }
    }

    /// Produce the wire response, reading a file body if there is one
    pub async fn into_http(self) -> hyper::Response<Full<Bytes>> {
        let body = match self.body {
            NormalizedBody::Bytes(b) => b,
            NormalizedBody::File(f) => match f.read_all().await {
                Ok(b) => b,
                Err(e) => {
                    logger::log_error(&format!("Failed to read file body: {e}"));
                    return internal_error_response();
                }
            },
        };

        let mut resp = hyper::Response::new(Full::new(body));
        *resp.status_mut() = self.status;
        *resp.headers_mut() = self.headers;
        resp
    }
}

fn internal_error_response() -> hyper::Response<Full<Bytes>> {
    let message = crate::error::ErrorCode::InternalServerError.message();
    let mut resp = hyper::Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp.headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from(message.len()));
    resp
}

/// Coerce any response shape into the canonical triple
///
/// Missing parts default to status 200, no headers, empty body. Text is encoded as UTF-8.
/// `Content-Length` always reflects the body, whose length is known for every body kind.
pub fn normalize(res: Response) -> NormalizedResponse {
    let (status, headers, body) = match res {
        Response::StatusHeadersBody(status, headers, body) => (status, headers, body),
        Response::StatusBody(status, body) => (status, Headers::new(), body),
        Response::StatusOnly(status) => (status, Headers::new(), Body::default()),
        Response::BodyOnly(body) => (200, Headers::new(), body),
    };

    let status = StatusCode::from_u16(status).unwrap_or_else(|_| {
        logger::log_warning(&format!("Handler returned invalid status {status}, using 500"));
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let body = match body {
        Body::Text(s) => NormalizedBody::Bytes(Bytes::from(s)),
        Body::Bytes(b) => NormalizedBody::Bytes(b),
        Body::File(f) => NormalizedBody::File(f),
    };

    let mut header_map = HeaderMap::with_capacity(headers.len() + 1);
    for (name, value) in headers.iter() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                header_map.insert(name, value);
            }
            _ => logger::log_warning(&format!("Dropping invalid response header '{name}'")),
        }
    }
    header_map.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    NormalizedResponse {
        status,
        headers: header_map,
        body,
    }
}

/// Content-Type of a normalized response, if one was set
pub fn content_type(res: &NormalizedResponse) -> Option<&str> {
    res.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}
