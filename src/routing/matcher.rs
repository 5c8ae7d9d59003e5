//! Route matching module
//!
//! Precedence: parameterized patterns are tried first, in registration order, and the first
//! one that matches wins. Only when none match is the path looked up as a literal pattern.
//! A literal route can therefore be shadowed by an earlier parameterized route that also
//! matches the path.

use super::registry::Route;
use crate::handler::Params;

/// Find the route for `path` among one method's routes, with its path parameters
pub fn match_route<'a>(path: &str, routes: &'a [Route]) -> Option<(&'a Route, Params)> {
    for route in routes.iter().filter(|r| r.pattern.is_parameterized()) {
        if let Some(captures) = route.pattern.captures(path) {
            let mut params = Params::new();
            for (name, value) in captures {
                params.insert(name, value);
            }
            return Some((route, params));
        }
    }

    routes
        .iter()
        .find(|r| !r.pattern.is_parameterized() && r.pattern.as_str() == path)
        .map(|route| (route, Params::new()))
}
