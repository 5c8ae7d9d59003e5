//! Routing module
//!
//! Provides the route table and path matching:
//! - Pattern compilation with `:name` segment parameters
//! - A per-method registry shared between registration and dispatch
//! - Matching with parameterized-first precedence

mod matcher;
mod pattern;
mod registry;

pub use matcher::match_route;
pub use pattern::RoutePattern;
pub use registry::{Route, RouteRegistry, RouteTable};
