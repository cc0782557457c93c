//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the file handlers.

pub mod mime;
pub mod query;
pub mod response;

// Re-export commonly used items
pub use query::query_param;
pub use response::{
    build_404_response, build_405_response, build_asset_response, build_health_response,
    error_response, json_response, ResponseBody,
};
