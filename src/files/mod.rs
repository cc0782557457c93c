//! Confined file access module
//!
//! Everything that touches the served tree goes through [`FileRoot`]:
//! path resolution, directory enumeration and the error taxonomy shared by
//! the listing and download handlers.

pub mod entry;
pub mod error;
pub mod resolver;

pub use entry::{read_entries, DirectoryListing};
pub use error::FileError;
pub use resolver::FileRoot;
