//! HTTP response building module
//!
//! Builders for the JSON API envelope, plain-text status responses and the
//! boxed body type shared by buffered and streamed responses.

use crate::files::FileError;
use crate::logger;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::io;

/// Body type for every response: buffered bodies never fail, streamed file
/// bodies can fail with an I/O error mid-transfer.
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Wrap a complete in-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Build a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ResponseBody> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(full(r#"{"error":"Internal server error"}"#))
                .unwrap_or_else(|_| Response::new(full("Error")));
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full(json))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full("Error"))
        })
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Translate a file error into the `{"error": ...}` envelope.
///
/// Server-side failures are logged with full detail; the client only gets
/// the generic message.
pub fn error_response(err: &FileError) -> Response<ResponseBody> {
    if err.is_server_error() {
        logger::log_error(&err.to_string());
    }

    let mut response = json_response(
        err.status(),
        &ErrorBody {
            error: err.client_message(),
        },
    );
    if matches!(err, FileError::MethodNotAllowed) {
        response
            .headers_mut()
            .insert("Allow", hyper::header::HeaderValue::from_static("GET"));
    }
    response
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(full("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response for plain-text routes
pub fn build_405_response(allow: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", allow)
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build health check response
pub fn build_health_response(status: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .body(full(status))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(full(status))
        })
}

/// Build a 200 response around an in-memory asset
pub fn build_asset_response(data: Vec<u8>, content_type: &str, is_head: bool) -> Response<ResponseBody> {
    let content_length = data.len();
    let body = if is_head { empty() } else { full(data) };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty())
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
