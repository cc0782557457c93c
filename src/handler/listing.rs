//! Directory listing endpoint

use super::path_param;
use crate::files::{read_entries, DirectoryListing, FileError, FileRoot};
use crate::http::{self, ResponseBody};
use hyper::http::request::Parts;
use hyper::{Method, Response, StatusCode};

/// `GET /api/files/list?path=<dir>` → `{"files": [...]}`
///
/// A missing or empty `path` lists the root.
pub async fn list_directory(parts: &Parts, root: &FileRoot) -> Response<ResponseBody> {
    match load_listing(parts, root).await {
        Ok(listing) => http::json_response(StatusCode::OK, &listing),
        Err(err) => http::error_response(&err),
    }
}

async fn load_listing(parts: &Parts, root: &FileRoot) -> Result<DirectoryListing, FileError> {
    if parts.method != Method::GET {
        return Err(FileError::MethodNotAllowed);
    }

    let requested = path_param(parts)?.unwrap_or_default();
    let resolved = root.resolve(&requested).await?;
    if !resolved.is_dir() {
        return Err(FileError::NotADirectory);
    }

    let files = read_entries(resolved.path()).await?;
    Ok(DirectoryListing { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{body_json, parts};
    use tempfile::TempDir;

    fn fixture() -> (TempDir, FileRoot) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"bbb").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();
        std::fs::write(dir.path().join("A").join("Photo.JPG"), b"jpeg").unwrap();
        std::fs::write(dir.path().join("A").join("README"), b"").unwrap();
        let root = FileRoot::create(dir.path()).unwrap();
        (dir, root)
    }

    fn names(value: &serde_json::Value) -> Vec<String> {
        value["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_root_listing_order() {
        let (_dir, root) = fixture();
        let response = list_directory(&parts(Method::GET, "/api/files/list"), &root).await;
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(names(&value), ["A", "a.txt", "b.txt"]);
        assert_eq!(value["files"][0]["type"], "directory");
        assert!(value["files"][0]["size"].is_null());
        assert!(value["files"][0]["extension"].is_null());
        assert_eq!(value["files"][2]["size"], 3);
    }

    #[tokio::test]
    async fn test_empty_path_is_root() {
        let (_dir, root) = fixture();
        let empty = body_json(list_directory(&parts(Method::GET, "/api/files/list?path="), &root).await).await;
        let absent = body_json(list_directory(&parts(Method::GET, "/api/files/list"), &root).await).await;
        assert_eq!(names(&empty), names(&absent));
    }

    #[tokio::test]
    async fn test_subdirectory_extensions() {
        let (_dir, root) = fixture();
        let response = list_directory(&parts(Method::GET, "/api/files/list?path=%2FA"), &root).await;
        let value = body_json(response).await;
        assert_eq!(names(&value), ["Photo.JPG", "README"]);
        assert_eq!(value["files"][0]["extension"], "jpg");
        assert!(value["files"][1]["extension"].is_null());
        assert_eq!(value["files"][1]["size"], 0);
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let (_dir, root) = fixture();
        let response = list_directory(&parts(Method::GET, "/api/files/list?path=a.txt"), &root).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Not a directory");
    }

    #[tokio::test]
    async fn test_traversal_and_missing() {
        let (_dir, root) = fixture();
        let response = list_directory(&parts(Method::GET, "/api/files/list?path=../.."), &root).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "access denied: path is outside the allowed directory"
        );

        let response = list_directory(&parts(Method::GET, "/api/files/list?path=nope"), &root).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "path does not exist");
    }

    #[tokio::test]
    async fn test_bad_paths_are_client_errors() {
        let (_dir, root) = fixture();
        let response = list_directory(&parts(Method::GET, "/api/files/list?path=a.txt/x"), &root).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "path does not exist");

        let response = list_directory(&parts(Method::GET, "/api/files/list?path=bad%00name"), &root).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid path");
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let (_dir, root) = fixture();
        let response = list_directory(&parts(Method::POST, "/api/files/list"), &root).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error"], "Method not allowed");
    }
}
