//! Static asset serving module
//!
//! The asset collaborator for every path outside the API prefix: loads files
//! from the configured directory, detects MIME types and answers conditional
//! requests.

use crate::config::AssetsConfig;
use crate::http::{self, cache, mime, ResponseBody};
use crate::logger;
use hyper::body::Bytes;
use hyper::{Method, Response};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Request information the asset service needs
pub struct AssetRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub if_none_match: Option<&'a str>,
}

/// Serve an asset request
pub async fn serve(req: &AssetRequest<'_>, assets: &AssetsConfig) -> Response<ResponseBody> {
    let is_head = match req.method {
        Method::GET => false,
        Method::HEAD => true,
        Method::OPTIONS => return http::build_options_response(),
        _ => return http::build_405_response("GET, HEAD, OPTIONS"),
    };

    match load_from_directory(&assets.dir, req.path, &assets.index_files).await {
        Some((content, content_type)) => {
            build_asset_response(content, content_type, req.if_none_match, is_head)
        }
        None if req.path == "/" => {
            http::response::build_html_response(get_default_homepage(), is_head)
        }
        None => http::build_404_response(),
    }
}

/// Resolve `path` inside `static_dir`, falling back to index files for
/// directories. Returns `None` for anything missing or outside the directory.
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, &'static str)> {
    let relative = path.trim_start_matches('/');

    let root = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    let mut file_path: PathBuf = root.join(relative);
    if relative.is_empty() || relative.ends_with('/') || file_path.is_dir() {
        file_path = index_files
            .iter()
            .map(|index| file_path.join(index))
            .find(|candidate| candidate.is_file())?;
    }

    // Missing files are ordinary 404s and not logged
    let resolved = file_path.canonicalize().ok()?;
    if !resolved.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            resolved.display()
        ));
        return None;
    }

    let content = match fs::read(&resolved).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", resolved.display()));
            return None;
        }
    };

    let content_type = mime::get_content_type(resolved.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build a 200 or 304 for loaded asset content
fn build_asset_response(
    content: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<ResponseBody> {
    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }
    http::response::build_cached_response(Bytes::from(content), content_type, &etag, is_head)
}

/// Landing page served at `/` when the asset directory has no index file
pub const fn get_default_homepage() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Chat Gate</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 40em; margin: 4em auto; padding: 0 1em; color: #222; }
        code { background: #f2f2f2; padding: 0.1em 0.3em; border-radius: 3px; }
    </style>
</head>
<body>
    <h1>Chat Gate</h1>
    <p>The chat endpoint is up. Send conversations with
    <code>POST /api/chat</code> and a body of
    <code>{"messages": [{"role": "user", "content": "..."}]}</code>.</p>
    <p>Place a front-end in the configured asset directory to replace this page.</p>
</body>
</html>
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chat-gate-assets-{name}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("css")).unwrap();
        std::fs::write(dir.join("index.html"), "<h1>chat</h1>").unwrap();
        std::fs::write(dir.join("css/app.css"), "body{}").unwrap();
        dir
    }

    fn assets(dir: &Path) -> AssetsConfig {
        AssetsConfig {
            dir: dir.to_string_lossy().into_owned(),
            ..AssetsConfig::default()
        }
    }

    fn get(path: &str) -> AssetRequest<'_> {
        AssetRequest {
            method: Method::GET,
            path,
            if_none_match: None,
        }
    }

    #[tokio::test]
    async fn test_root_serves_index_file() {
        let dir = scratch_dir("index");
        let resp = serve(&get("/"), &assets(&dir)).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<h1>chat</h1>");
    }

    #[tokio::test]
    async fn test_nested_asset_and_etag_revalidation() {
        let dir = scratch_dir("etag");
        let first = serve(&get("/css/app.css"), &assets(&dir)).await;
        assert_eq!(first.status(), 200);
        assert_eq!(first.headers()["content-type"], "text/css; charset=utf-8");
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let again = AssetRequest {
            if_none_match: Some(etag.as_str()),
            ..get("/css/app.css")
        };
        assert_eq!(serve(&again, &assets(&dir)).await.status(), 304);
    }

    #[tokio::test]
    async fn test_traversal_and_missing_are_404() {
        let dir = scratch_dir("traversal");
        assert_eq!(serve(&get("/../../etc/passwd"), &assets(&dir)).await.status(), 404);
        assert_eq!(serve(&get("/missing.js"), &assets(&dir)).await.status(), 404);
    }

    #[tokio::test]
    async fn test_root_without_asset_dir_serves_landing_page() {
        let cfg = AssetsConfig {
            dir: "/nonexistent/chat-gate-assets".to_string(),
            ..AssetsConfig::default()
        };
        let resp = serve(&get("/"), &cfg).await;
        assert_eq!(resp.status(), 200);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(std::str::from_utf8(&body).unwrap().contains("/api/chat"));
    }

    #[tokio::test]
    async fn test_head_and_unsupported_methods() {
        let dir = scratch_dir("methods");
        let head = AssetRequest {
            method: Method::HEAD,
            ..get("/")
        };
        let resp = serve(&head, &assets(&dir)).await;
        assert_eq!(resp.status(), 200);
        assert!(resp.into_body().collect().await.unwrap().to_bytes().is_empty());

        let delete = AssetRequest {
            method: Method::DELETE,
            ..get("/")
        };
        assert_eq!(serve(&delete, &assets(&dir)).await.status(), 405);
    }
}
