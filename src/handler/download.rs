//! File download endpoint
//!
//! Streams the whole file; no ranges, no compression, no cache headers.

use super::path_param;
use crate::files::{FileError, FileRoot};
use crate::http::{self, mime, ResponseBody};
use crate::logger;
use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::HeaderValue;
use hyper::http::request::Parts;
use hyper::{Method, Response, StatusCode};
use std::io;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// `GET /api/files?path=<file>` → file bytes as an attachment
pub async fn download_file(parts: &Parts, root: &FileRoot) -> Response<ResponseBody> {
    match open_download(parts, root).await {
        Ok(response) => response,
        Err(err) => http::error_response(&err),
    }
}

async fn open_download(parts: &Parts, root: &FileRoot) -> Result<Response<ResponseBody>, FileError> {
    if parts.method != Method::GET {
        return Err(FileError::MethodNotAllowed);
    }

    let requested = path_param(parts)?
        .filter(|p| !p.is_empty())
        .ok_or(FileError::MissingPath)?;
    let resolved = root.resolve(&requested).await?;
    if !resolved.is_file() {
        return Err(FileError::NotAFile);
    }

    let name = resolved
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = File::open(resolved.path())
        .await
        .map_err(|e| FileError::access("Failed to access file", e))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| FileError::access("Failed to access file", e))?
        .len();

    // Headers are already out when a read fails; the body is cut and logged
    let shown_path = resolved.path().display().to_string();
    let stream = ReaderStream::new(file)
        .inspect_err(move |e| {
            logger::log_error(&format!("Download of '{shown_path}' aborted: {e}"));
        })
        .map_ok(Frame::data);

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", mime::content_type_for(&name))
        .header("Content-Disposition", attachment_disposition(&name))
        .header("Content-Length", size)
        .body(StreamBody::new(stream).boxed())
        .map_err(|e| FileError::access("Failed to access file", io::Error::other(e)))
}

/// `attachment; filename="<name>"` with quotes escaped and control
/// characters replaced
fn attachment_disposition(name: &str) -> HeaderValue {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_control() => escaped.push('_'),
            c => escaped.push(c),
        }
    }

    HeaderValue::from_bytes(format!("attachment; filename=\"{escaped}\"").as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
