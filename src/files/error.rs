//! File access error taxonomy
//!
//! Every failure a file handler can hit maps to exactly one variant, and each
//! variant knows its HTTP status and the message the client is allowed to see.

use hyper::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// Traversal attempt or a path that lands outside the root
    #[error("access denied: path is outside the allowed directory")]
    OutsideRoot,

    /// Query value that cannot be turned into a path at all
    #[error("invalid path")]
    Malformed,

    #[error("Path parameter is required")]
    MissingPath,

    #[error("path does not exist")]
    NotFound,

    #[error("Not a directory")]
    NotADirectory,

    #[error("Not a file")]
    NotAFile,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Any other I/O failure; `context` is what the client sees
    #[error("{context}: {source}")]
    Access {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    pub const fn access(context: &'static str, source: io::Error) -> Self {
        Self::Access { context, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::OutsideRoot
            | Self::Malformed
            | Self::MissingPath
            | Self::NotFound
            | Self::NotADirectory
            | Self::NotAFile => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Access { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message for the `{error: ...}` envelope. Server-side detail of
    /// access failures is never included.
    pub fn client_message(&self) -> String {
        match self {
            Self::Access { context, .. } => (*context).to_string(),
            other => other.to_string(),
        }
    }

    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Access { .. })
    }
}
