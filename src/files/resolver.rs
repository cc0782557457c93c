//! Path resolution against a fixed root directory
//!
//! A requested path goes through two independent containment checks before
//! anything touches the filesystem:
//!
//! 1. a string-level check on the cleaned request (`..` prefix is rejected);
//! 2. a component-level check on the final joined path, which must still sit
//!    under the root after normalization.
//!
//! Only then is the candidate stat'ed. [`FileRoot::candidate`] is the pure
//! part and never performs I/O.

use super::FileError;
use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Absolute directory that every resolved path must stay inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRoot {
    base: PathBuf,
}

/// A path proven to be inside its [`FileRoot`] and present on disk.
///
/// Only [`FileRoot::resolve`] can build one.
#[derive(Debug)]
pub struct ResolvedPath {
    path: PathBuf,
    metadata: Metadata,
}

impl ResolvedPath {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }
}

impl FileRoot {
    /// Wrap an absolute directory path. Does not touch the filesystem.
    pub fn new(base: impl Into<PathBuf>) -> io::Result<Self> {
        let base = normalize_components(&base.into());
        if !base.is_absolute() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("root directory must be absolute: {}", base.display()),
            ));
        }
        Ok(Self { base })
    }

    /// Create `dir` (and parents) if absent and pin its canonical form as the root.
    pub fn create(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Self::new(dir.canonicalize()?)
    }

    /// Use an existing directory as the root. Fails if it is missing.
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let canonical = dir.as_ref().canonicalize()?;
        if !canonical.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", canonical.display()),
            ));
        }
        Self::new(canonical)
    }

    pub fn path(&self) -> &Path {
        &self.base
    }

    /// Compute the contained absolute path for `requested` without any I/O.
    pub fn candidate(&self, requested: &str) -> Result<PathBuf, FileError> {
        let requested = if requested.is_empty() { "/" } else { requested };
        if requested.contains('\0') {
            return Err(FileError::Malformed);
        }

        let cleaned = clean(&requested.replace('\\', "/"));
        if cleaned == ".." || cleaned.starts_with("../") {
            return Err(FileError::OutsideRoot);
        }

        let relative = cleaned.strip_prefix('/').unwrap_or(&cleaned);
        let joined = normalize_components(&self.base.join(relative));

        // Authoritative check, re-derived from the joined path
        match joined.strip_prefix(&self.base) {
            Ok(rel) if !matches!(rel.components().next(), Some(Component::ParentDir)) => {
                Ok(joined)
            }
            _ => Err(FileError::OutsideRoot),
        }
    }

    /// Resolve `requested` to an existing path inside the root.
    pub async fn resolve(&self, requested: &str) -> Result<ResolvedPath, FileError> {
        let path = self.candidate(requested)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok(ResolvedPath { path, metadata }),
            Err(e) => Err(classify_stat_error(e)),
        }
    }
}

/// Client-caused stat failures are 400s; anything else is a server fault.
fn classify_stat_error(err: io::Error) -> FileError {
    match err.kind() {
        // A file used as an intermediate directory (`a.txt/x`)
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => FileError::NotFound,
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidFilename => FileError::Malformed,
        _ => FileError::access("Failed to access path", err),
    }
}

/// Lexically clean a slash-separated path.
///
/// Collapses repeated separators, drops `.` segments and resolves `..`
/// against the preceding segment. A rooted path never climbs above `/`;
/// an unrooted one keeps its leading `..` segments. The empty result is `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            name => parts.push(name),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Component-wise normalization of a platform path, no filesystem access.
fn normalize_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, FileRoot) {
        let dir = tempfile::tempdir().unwrap();
        let root = FileRoot::create(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(""), ".");
        assert_eq!(clean("/"), "/");
        assert_eq!(clean("a/./b//c/.."), "a/b");
        assert_eq!(clean("/../x"), "/x");
        assert_eq!(clean("a/../../x"), "../x");
        assert_eq!(clean("../.."), "../..");
        assert_eq!(clean("docs/"), "docs");
        assert_eq!(clean("/a/b/../../.."), "/");
    }

    #[test]
    fn test_new_requires_absolute() {
        assert!(FileRoot::new("relative/dir").is_err());
    }

    #[test]
    fn test_create_makes_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("files");
        let root = FileRoot::create(&target).unwrap();
        assert!(target.is_dir());
        assert!(root.path().is_absolute());
    }

    #[test]
    fn test_open_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileRoot::open(dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_empty_and_slash_are_root() {
        let (_dir, root) = temp_root();
        assert_eq!(root.candidate("").unwrap(), root.path());
        assert_eq!(root.candidate("/").unwrap(), root.path());
        assert_eq!(root.candidate(".").unwrap(), root.path());
    }

    #[test]
    fn test_traversal_rejected() {
        let (_dir, root) = temp_root();
        for input in ["..", "../", "../etc/passwd", "a/../../etc", "./../x", "..\\..\\etc"] {
            assert!(
                matches!(root.candidate(input), Err(FileError::OutsideRoot)),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_rooted_traversal_is_clamped() {
        let (_dir, root) = temp_root();
        assert_eq!(
            root.candidate("/../../etc").unwrap(),
            root.path().join("etc")
        );
    }

    #[test]
    fn test_nested_path_joined() {
        let (_dir, root) = temp_root();
        assert_eq!(
            root.candidate("docs/./reports//2024/../q1.txt").unwrap(),
            root.path().join("docs").join("reports").join("q1.txt")
        );
    }

    #[tokio::test]
    async fn test_resolve_existing_and_missing() {
        let (dir, root) = temp_root();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("a.txt"), b"hi").unwrap();

        let resolved = root.resolve("sub/a.txt").await.unwrap();
        assert!(resolved.is_file());
        assert_eq!(resolved.path(), root.path().join("sub").join("a.txt"));

        let resolved = root.resolve("/sub").await.unwrap();
        assert!(resolved.is_dir());

        assert!(matches!(
            root.resolve("sub/missing.txt").await,
            Err(FileError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_resolve_client_mistakes_are_not_server_errors() {
        let (dir, root) = temp_root();
        std::fs::write(dir.path().join("a.txt"), b"hi").unwrap();

        assert!(matches!(root.resolve("a.txt/x").await, Err(FileError::NotFound)));
        assert!(matches!(root.resolve("bad\0name").await, Err(FileError::Malformed)));

        let long_name = "n".repeat(4096);
        let err = root.resolve(&long_name).await.unwrap_err();
        assert!(!err.is_server_error(), "{err}");
    }

    #[test]
    fn test_classify_stat_error() {
        use io::ErrorKind;
        assert!(matches!(
            classify_stat_error(ErrorKind::NotADirectory.into()),
            FileError::NotFound
        ));
        assert!(matches!(
            classify_stat_error(ErrorKind::InvalidFilename.into()),
            FileError::Malformed
        ));
        let err = classify_stat_error(ErrorKind::PermissionDenied.into());
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_resolve_rejects_before_touching_disk() {
        let (dir, _) = temp_root();
        // Root below an existing sibling; the sibling must stay unreachable
        let inner = FileRoot::create(dir.path().join("inner")).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"x").unwrap();
        assert!(matches!(
            inner.resolve("../secret.txt").await,
            Err(FileError::OutsideRoot)
        ));
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("..".to_string()),
            Just(".".to_string()),
            Just(String::new()),
            "[a-zA-Z0-9_-]{1,8}",
        ]
    }

    /// Whether an unrooted request climbs above its starting directory.
    fn escapes(segments: &[String]) -> bool {
        let mut depth = 0i32;
        for seg in segments {
            match seg.as_str() {
                "" | "." => {}
                ".." => {
                    depth -= 1;
                    if depth < 0 {
                        return true;
                    }
                }
                _ => depth += 1,
            }
        }
        false
    }

    proptest! {
        #[test]
        fn prop_candidate_stays_inside_root(
            segments in proptest::collection::vec(segment(), 0..10),
            rooted in any::<bool>(),
        ) {
            let (_dir, root) = temp_root();
            let joined = segments.join("/");
            let input = if rooted { format!("/{joined}") } else { joined };
            let rooted = input.starts_with('/');

            match root.candidate(&input) {
                Ok(path) => {
                    prop_assert!(path.starts_with(root.path()));
                    prop_assert!(!path.components().any(|c| c == Component::ParentDir));
                    prop_assert!(rooted || !escapes(&segments));
                }
                Err(err) => {
                    prop_assert!(matches!(err, FileError::OutsideRoot));
                    prop_assert!(!rooted && escapes(&segments));
                }
            }
        }
    }
}
