//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, dispatch and
//! access logging.

use crate::config::AppState;
use crate::handler::{download, listing, static_files};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::http::request::Parts;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const LIST_PATH: &str = "/api/files/list";
pub const DOWNLOAD_PATH: &str = "/api/files";
pub const HEALTH_PATH: &str = "/healthz";

/// Main entry point for HTTP request handling
///
/// The request body is never read; every endpoint is driven by method,
/// path and query alone.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let (parts, _) = req.into_parts();
    let started = Instant::now();

    let response = route_request(&parts, &state).await;

    if state.access_log() {
        log_access(&parts, &response, peer_addr, started, &state);
    }
    Ok(response)
}

async fn route_request(parts: &Parts, state: &AppState) -> Response<ResponseBody> {
    match parts.uri.path() {
        LIST_PATH => listing::list_directory(parts, &state.files_root).await,
        DOWNLOAD_PATH => download::download_file(parts, &state.files_root).await,
        HEALTH_PATH => http::build_health_response("ok"),
        _ => static_files::serve_asset(parts, state.public_root.as_ref()).await,
    }
}

fn log_access(
    parts: &Parts,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", parts.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}
