//! Request handler module
//!
//! Routing dispatch plus the three handlers: directory listing, file
//! download and companion UI assets. All of them resolve client paths
//! through [`crate::files::FileRoot`].

pub mod download;
pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;

use crate::files::FileError;
use crate::http;
use hyper::http::request::Parts;

/// Decoded `path` query parameter, `None` when absent
fn path_param(parts: &Parts) -> Result<Option<String>, FileError> {
    http::query_param(parts.uri.query(), "path").map_err(|_| FileError::Malformed)
}
