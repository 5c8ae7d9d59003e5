//! Route pattern compilation
//!
//! A pattern such as `/users/:id` is compiled once, at registration. Each `:name` token
//! (a colon followed by everything up to the next `/`) becomes a capture matching one path
//! segment; all other text must match literally.

use crate::logger;
use regex::Regex;
use std::fmt;

const PARAM_MARKER: char = ':';
const SEGMENT_CAPTURE: &str = "([^/]+)";

/// A registered path template
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    matcher: Option<Regex>,
    names: Vec<String>,
}

impl RoutePattern {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (matcher, names) = if raw.contains(PARAM_MARKER) {
            compile(&raw)
        } else {
            (None, Vec::new())
        };
        Self {
            raw,
            matcher,
            names,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern declares `:name` placeholders
    pub const fn is_parameterized(&self) -> bool {
        self.matcher.is_some()
    }

    /// Placeholder names in left-to-right order
    pub fn param_names(&self) -> &[String] {
        &self.names
    }

    /// Match a parameterized pattern, returning `(name, value)` pairs in segment order
    ///
    /// Literal patterns never match here; they are looked up by exact path instead.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let caps = self.matcher.as_ref()?.captures(path)?;
        Some(
            self.names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (name.as_str(), m.as_str())))
                .collect(),
        )
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for RoutePattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoutePattern {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Build an anchored regex for a parameterized pattern
fn compile(raw: &str) -> (Option<Regex>, Vec<String>) {
    let mut source = String::with_capacity(raw.len() + 16);
    let mut names = Vec::new();
    source.push('^');

    let mut rest = raw;
    while let Some(idx) = rest.find(PARAM_MARKER) {
        source.push_str(&regex::escape(&rest[..idx]));
        let token = &rest[idx + 1..];
        let end = token.find('/').unwrap_or(token.len());
        if end == 0 {
            // A bare ':' is literal text
            source.push_str(&regex::escape(":"));
        } else {
            names.push(token[..end].to_string());
            source.push_str(SEGMENT_CAPTURE);
        }
        rest = &token[end..];
    }
    source.push_str(&regex::escape(rest));
    source.push('$');

    if names.is_empty() {
        return (None, names);
    }

    match Regex::new(&source) {
        Ok(re) => (Some(re), names),
        Err(e) => {
            logger::log_warning(&format!(
                "Route pattern '{raw}' failed to compile ({e}), treating it as a literal path"
            ));
            (None, Vec::new())
        }
    }
}
