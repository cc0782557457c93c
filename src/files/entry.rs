//! Directory entry records and directory enumeration

use super::FileError;
use crate::logger;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::ffi::OsString;
use std::fs::Metadata;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

/// Wire view of one filesystem entry.
///
/// `extension` and `size` are `None` for directories and serialize as `null`.
/// `created_at` mirrors `modified_at`: birth time is not tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub extension: Option<String>,
    pub size: Option<u64>,
    pub modified_at: String,
    pub created_at: String,
}

/// Listing response body
#[derive(Debug, Serialize)]
pub struct DirectoryListing {
    pub files: Vec<DirectoryEntry>,
}

impl DirectoryEntry {
    /// Build a record from a name and its (non-followed) metadata.
    ///
    /// Returns `None` when the modification time is unavailable.
    pub fn from_metadata(name: String, metadata: &Metadata) -> Option<Self> {
        let modified = metadata.modified().ok()?;
        let timestamp = DateTime::<Utc>::from(modified).to_rfc3339_opts(SecondsFormat::Secs, true);

        let (kind, extension, size) = if metadata.is_dir() {
            (EntryKind::Directory, None, None)
        } else {
            (EntryKind::File, extension_of(&name), Some(metadata.len()))
        };

        Some(Self {
            name,
            kind,
            extension,
            size,
            created_at: timestamp.clone(),
            modified_at: timestamp,
        })
    }
}

/// Lowercased text after the last `.`, or `None` if there is none.
pub fn extension_of(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

/// Directories first, then files; byte-wise name order within each group.
pub fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    match (a.kind, b.kind) {
        (EntryKind::Directory, EntryKind::File) => Ordering::Less,
        (EntryKind::File, EntryKind::Directory) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

/// Record for one child, or `None` (logged) when it cannot be listed.
///
/// Names that are not valid UTF-8 are skipped: a lossy rendering could not
/// be sent back to the download endpoint.
fn record_for(name: OsString, metadata: io::Result<Metadata>) -> Option<DirectoryEntry> {
    let name = match name.into_string() {
        Ok(name) => name,
        Err(raw) => {
            logger::log_warning(&format!(
                "Skipping {} in listing: name is not valid UTF-8",
                raw.to_string_lossy()
            ));
            return None;
        }
    };

    let metadata = match metadata {
        Ok(metadata) => metadata,
        Err(e) => {
            logger::log_warning(&format!("Skipping '{name}' in listing: {e}"));
            return None;
        }
    };

    let record = DirectoryEntry::from_metadata(name.clone(), &metadata);
    if record.is_none() {
        logger::log_warning(&format!(
            "Skipping '{name}' in listing: modification time unavailable"
        ));
    }
    record
}

/// Read the immediate children of `dir` as sorted records.
///
/// Partial results are deliberate: a child whose metadata cannot be read
/// (removed mid-listing, permission denied) is logged and left out instead of
/// failing the whole listing.
pub async fn read_entries(dir: &Path) -> Result<Vec<DirectoryEntry>, FileError> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| FileError::access("Failed to read directory", e))?;

    let mut entries = Vec::new();
    loop {
        let child = match reader.next_entry().await {
            Ok(Some(child)) => child,
            Ok(None) => break,
            Err(e) => return Err(FileError::access("Failed to read directory", e)),
        };

        let metadata = child.metadata().await;
        if let Some(entry) = record_for(child.file_name(), metadata) {
            entries.push(entry);
        }
    }

    entries.sort_by(compare_entries);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of(".bashrc").as_deref(), Some("bashrc"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[tokio::test]
    async fn test_read_entries_order_and_shape() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"bb").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();
        std::fs::create_dir(dir.path().join("z")).unwrap();
        std::fs::write(dir.path().join("README"), b"").unwrap();

        let entries = read_entries(dir.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["A", "z", "README", "a.txt", "b.txt"]);

        let a_dir = &entries[0];
        assert_eq!(a_dir.kind, EntryKind::Directory);
        assert_eq!(a_dir.extension, None);
        assert_eq!(a_dir.size, None);

        let readme = &entries[2];
        assert_eq!(readme.kind, EntryKind::File);
        assert_eq!(readme.extension, None);
        assert_eq!(readme.size, Some(0));

        let b = &entries[4];
        assert_eq!(b.extension.as_deref(), Some("txt"));
        assert_eq!(b.size, Some(2));
        assert_eq!(b.created_at, b.modified_at);
        assert!(DateTime::parse_from_rfc3339(&b.modified_at).is_ok());
    }

    #[test]
    fn test_unreadable_child_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.txt");
        std::fs::write(&path, b"ok").unwrap();

        let kept = record_for("kept.txt".into(), std::fs::symlink_metadata(&path)).unwrap();
        assert_eq!(kept.name, "kept.txt");
        assert_eq!(kept.size, Some(2));

        let gone = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(record_for("locked.txt".into(), Err(gone)).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_name_is_skipped() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.txt"), b"").unwrap();
        let raw = std::ffi::OsStr::from_bytes(b"bad\xffname");
        // Some filesystems refuse such names outright
        if std::fs::write(dir.path().join(raw), b"").is_err() {
            return;
        }

        let entries = read_entries(dir.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["plain.txt"]);
    }

    #[tokio::test]
    async fn test_read_entries_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_entries(dir.path()).await.unwrap().is_empty());
    }

    #[test]
    fn test_json_shape_uses_null_markers() {
        let entry = DirectoryEntry {
            name: "docs".to_string(),
            kind: EntryKind::Directory,
            extension: None,
            size: None,
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "docs",
                "type": "directory",
                "extension": null,
                "size": null,
                "modifiedAt": "2024-01-01T00:00:00Z",
                "createdAt": "2024-01-01T00:00:00Z",
            })
        );
    }
}
