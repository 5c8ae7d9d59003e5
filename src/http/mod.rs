//! HTTP protocol layer module
//!
//! Methods, content types and the response shapes handlers produce. Independent of routing.

pub mod method;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use method::Method;
pub use response::{
    normalize, redirect, redirect_with, Body, FileBody, Headers, NormalizedBody, NormalizedResponse,
    Response,
};
