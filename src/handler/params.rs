//! Request parameters
//!
//! `Params` collects path captures, query-string pairs and decoded body fields into one
//! map. Later sources overwrite earlier ones key by key.

use crate::error::ErrorCode;
use crate::logger;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Parameter map handed to handlers
///
/// Values from paths, query strings and form bodies are strings; JSON bodies may contribute
/// any JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(HashMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String value of `name`; `None` when absent or not a JSON string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge every entry of `other`, overwriting existing keys
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    fn merge_object(&mut self, object: Map<String, Value>) {
        self.0.extend(object);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Decode a URL query string (or form body) into string parameters
///
/// `+` is treated as an encoded space before percent-decoding. Repeated keys keep the last
/// value; a key without `=` maps to the empty string.
pub fn parse_url_search_params(query: &str) -> Params {
    let query = query.strip_prefix('?').unwrap_or(query);
    let spaced = query.replace('+', " ");
    spaced
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}

/// Parsed `Content-Type` header: lowercase media type plus its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub media_type: String,
    pub params: Vec<(String, String)>,
}

impl ContentType {
    pub const DEFAULT: &'static str = "application/octet-stream";

    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(';').map(str::trim);
        let media_type = parts
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(Self::DEFAULT)
            .to_ascii_lowercase();
        let params = parts
            .filter_map(|p| p.split_once('='))
            .map(|(k, v)| {
                (
                    k.trim().to_ascii_lowercase(),
                    v.trim().trim_matches('"').to_string(),
                )
            })
            .collect();
        Self { media_type, params }
    }

    /// `charset` parameter, case-insensitive on the key; defaults to `utf-8`
    pub fn charset(&self) -> &str {
        self.params
            .iter()
            .find(|(k, _)| k == "charset")
            .map_or("utf-8", |(_, v)| v.as_str())
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::parse(Self::DEFAULT)
    }
}

/// Decode body bytes with the declared charset
pub fn decode_body(bytes: &[u8], charset: &str) -> Result<String, ErrorCode> {
    let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) else {
        logger::log_warning(&format!("Unsupported request charset '{charset}'"));
        return Err(ErrorCode::BadRequest);
    };
    let (text, _, _) = encoding.decode(bytes);
    Ok(text.into_owned())
}

/// Turn a request body into parameters according to its content type
///
/// Form bodies decode like query strings and JSON objects merge field by field. Non-object
/// JSON and every other media type contribute nothing.
pub fn parse_body(content_type: &ContentType, bytes: &[u8]) -> Result<Params, ErrorCode> {
    let text = decode_body(bytes, content_type.charset())?;

    match content_type.media_type.as_str() {
        "application/x-www-form-urlencoded" => Ok(parse_url_search_params(&text)),
        "application/json" => {
            let value: Value = serde_json::from_str(&text).map_err(|e| {
                logger::log_warning(&format!("Malformed JSON body: {e}"));
                ErrorCode::BadRequest
            })?;
            let mut params = Params::new();
            if let Value::Object(object) = value {
                params.merge_object(object);
            }
            Ok(params)
        }
        _ => Ok(Params::new()),
    }
}
