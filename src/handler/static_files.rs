//! Static file serving module
//!
//! Fallback for requests no route matched. Resolves `root + path`, substitutes
//! `index.html` for directories, and answers with the opened file. Anything that does not
//! resolve to a regular file is "no match", never an error, so dispatch can fall through to 404.

use crate::http::{mime, Body, FileBody, Headers, Response};
use crate::logger;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const INDEX_FILE: &str = "index.html";

/// Resolve `path` under `root` and open it as a 200 response
pub async fn respond_static(root: &Path, path: &str) -> Option<Response> {
    let mut file_path = resolve_path(root, path)?;

    let mut meta = fs::metadata(&file_path).await.ok()?;
    if meta.is_dir() {
        file_path.push(INDEX_FILE);
        meta = fs::metadata(&file_path).await.ok()?;
    }
    if !meta.is_file() {
        return None;
    }

    let file = match fs::File::open(&file_path).await {
        Ok(f) => f,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to open static file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let len = meta.len();
    let headers = Headers::new()
        .with("Content-Length", len)
        .with("Content-Type", mime::content_type_for_path(&file_path));

    Some(Response::StatusHeadersBody(
        200,
        headers,
        Body::File(FileBody::new(file, len)),
    ))
}

/// Map a request path onto the filesystem below `root`
///
/// The path is percent-decoded first. Any `..` segment is refused, as is a decoded NUL.
fn resolve_path(root: &Path, path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(path).ok()?;
    if decoded.contains('\0') {
        return None;
    }

    let mut resolved = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
                return None;
            }
            s if s.contains('\\') => return None,
            s => resolved.push(s),
        }
    }
    Some(resolved)
}
