//! Error types
//!
//! `ErrorCode` is the closed set of HTTP status signals used while resolving and decoding a
//! request. `HandlerError` is what application handlers may fail with. Both are converted into
//! an ordinary response at the dispatch boundary and never reach the serving loop.

use thiserror::Error;

/// Status codes used as failure signals during dispatch
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    #[error("bad request")]
    BadRequest = 400,
    #[error("unauthorized")]
    Unauthorized = 401,
    #[error("forbidden")]
    Forbidden = 403,
    #[error("not found")]
    NotFound = 404,
    #[error("request timeout")]
    RequestTimeout = 408,
    #[error("precondition failed")]
    PreconditionFailed = 412,
    #[error("internal server error")]
    InternalServerError = 500,
    #[error("not implemented")]
    NotImplemented = 501,
    #[error("bad gateway")]
    BadGateway = 502,
    #[error("service unavailable")]
    ServiceUnavailable = 503,
}

impl ErrorCode {
    /// Numeric HTTP status
    pub const fn status(self) -> u16 {
        self as u16
    }

    /// Short plain-text message sent as the response body
    pub const fn message(self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::RequestTimeout => "request timeout",
            Self::PreconditionFailed => "precondition failed",
            Self::InternalServerError => "internal server error",
            Self::NotImplemented => "not implemented",
            Self::BadGateway => "bad gateway",
            Self::ServiceUnavailable => "service unavailable",
        }
    }

    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            408 => Some(Self::RequestTimeout),
            412 => Some(Self::PreconditionFailed),
            500 => Some(Self::InternalServerError),
            501 => Some(Self::NotImplemented),
            502 => Some(Self::BadGateway),
            503 => Some(Self::ServiceUnavailable),
            _ => None,
        }
    }
}

/// Message table lookup for any numeric status; unmapped codes yield an empty string
pub fn status_message(status: u16) -> &'static str {
    ErrorCode::from_status(status).map_or("", ErrorCode::message)
}

/// Failure returned by an application handler
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Respond with the code's status and table message
    #[error(transparent)]
    Code(#[from] ErrorCode),
    /// Anything else; logged, then answered with 500
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl HandlerError {
    /// Wrap an arbitrary error as a handler failure
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed(anyhow::Error::new(err))
    }
}

/// Startup and serving faults
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid listen address: {0}")]
    Address(String),
}
