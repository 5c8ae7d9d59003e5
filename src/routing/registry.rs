//! Route registry
//!
//! Per-method, insertion-ordered route tables. Writers replace a method's table wholesale
//! (copy-on-write), so a dispatch holds a consistent snapshot while registrations continue.
//! A request racing a mutation sees either the old or the new table.

use super::pattern::RoutePattern;
use crate::handler::{Handler, HandlerConfig};
use crate::http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// One registered route
#[derive(Clone)]
pub struct Route {
    pub pattern: RoutePattern,
    pub handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Snapshot of one method's routes, in registration order
pub type RouteTable = Arc<Vec<Route>>;

#[derive(Default)]
pub struct RouteRegistry {
    tables: RwLock<HashMap<Method, RouteTable>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every config; an existing (method, pattern) entry is replaced in place
    pub fn register(&self, configs: impl IntoIterator<Item = HandlerConfig>) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        for HandlerConfig {
            method,
            pattern,
            handler,
        } in configs
        {
            let table = tables.entry(method).or_default();
            let routes = Arc::make_mut(table);
            let route = Route { pattern, handler };
            match routes.iter_mut().find(|r| r.pattern == route.pattern) {
                Some(existing) => *existing = route,
                None => routes.push(route),
            }
        }
    }

    /// Remove the entry if present; absent entries are ignored
    pub fn unregister(&self, pattern: &str, method: Method) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = tables.get_mut(&method) {
            if table.iter().any(|r| r.pattern.as_str() == pattern) {
                Arc::make_mut(table).retain(|r| r.pattern.as_str() != pattern);
            }
        }
    }

    /// Current routes for `method`
    pub fn lookup(&self, method: Method) -> RouteTable {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(&method).map(Arc::clone).unwrap_or_default()
    }

    /// Total number of registered routes across all methods
    pub fn len(&self) -> usize {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_map().entries(tables.iter()).finish()
    }
}
