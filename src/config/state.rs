// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::files::FileRoot;
use crate::logger;
use std::io;

/// Application state
///
/// Built once at startup and shared behind an `Arc`; nothing in it changes
/// while the server runs.
pub struct AppState {
    pub config: Config,
    /// Root of the file API
    pub files_root: FileRoot,
    /// Root of the companion UI, `None` when the directory does not exist
    pub public_root: Option<FileRoot>,
}

impl AppState {
    /// Create the files root (if absent) and open the public directory.
    pub fn new(config: Config) -> io::Result<Self> {
        let files_root = FileRoot::create(&config.storage.root_dir)?;
        let public_root = match FileRoot::open(&config.storage.public_dir) {
            Ok(root) => Some(root),
            Err(e) => {
                logger::log_warning(&format!(
                    "Public directory '{}' unavailable, UI disabled: {e}",
                    config.storage.public_dir
                ));
                None
            }
        };

        Ok(Self {
            config,
            files_root,
            public_root,
        })
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
