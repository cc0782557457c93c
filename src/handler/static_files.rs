//! Companion UI assets
//!
//! Serves the public directory at every path that is not an API route. The
//! request path goes through the same [`FileRoot`] resolution as the file API.

use crate::files::{FileError, FileRoot};
use crate::http::{self, mime, ResponseBody};
use crate::logger;
use hyper::http::request::Parts;
use hyper::{Method, Response};
use std::path::PathBuf;
use tokio::fs;

const INDEX_FILE: &str = "index.html";

/// Serve a UI asset for GET/HEAD, 404 when absent or outside the public root
pub async fn serve_asset(parts: &Parts, root: Option<&FileRoot>) -> Response<ResponseBody> {
    let is_head = parts.method == Method::HEAD;
    if parts.method != Method::GET && !is_head {
        return http::build_405_response("GET, HEAD");
    }

    let Some(root) = root else {
        return http::build_404_response();
    };
    let Some(path) = asset_path(parts.uri.path()) else {
        return http::build_404_response();
    };

    match load_asset(root, &path).await {
        Some((content, content_type)) => http::build_asset_response(content, content_type, is_head),
        None => http::build_404_response(),
    }
}

/// Decoded request path made relative to the public root.
///
/// Dropping the leading `/` keeps `..` segments unclamped, so a traversal is
/// rejected by the resolver instead of silently mapped inside the root.
fn asset_path(uri_path: &str) -> Option<String> {
    let decoded = urlencoding::decode(uri_path).ok()?;
    Some(decoded.trim_start_matches('/').to_string())
}

/// Load an asset, falling back to `index.html` for directories
async fn load_asset(root: &FileRoot, path: &str) -> Option<(Vec<u8>, &'static str)> {
    let file_path = match locate(root, path).await {
        Ok(p) => p,
        Err(FileError::OutsideRoot) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
            return None;
        }
        // Not found is common (404), no need to log
        Err(_) => return None,
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some((content, mime::content_type_for(&name)))
}

async fn locate(root: &FileRoot, path: &str) -> Result<PathBuf, FileError> {
    let resolved = root.resolve(path).await?;
    if resolved.is_file() {
        return Ok(resolved.path().to_path_buf());
    }

    let index = format!("{}/{INDEX_FILE}", path.trim_end_matches('/'));
    let resolved = root.resolve(&index).await?;
    if resolved.is_file() {
        Ok(resolved.path().to_path_buf())
    } else {
        Err(FileError::NotAFile)
    }
}
