//! Request entry point
//!
//! Checks the method, classifies the path and turns the outcome into a response.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::static_files::{self, RequestTarget};
use crate::http::{self, ByteRange, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderMap, HeaderName, RANGE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// The request body is dropped unread, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    drop(body);
    let response = respond(&parts, &state).await;

    if state.access_log() {
        let entry = access_entry(&parts, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }
    Ok(response)
}

async fn respond(req: &Parts, state: &AppState) -> HttpResponse {
    let server_name = state.config.http.server_name.as_str();
    let is_head = match req.method {
        Method::GET => false,
        Method::HEAD => true,
        Method::OPTIONS => return http::build_options_response(server_name),
        ref other => {
            logger::log_debug(&format!("Method not allowed: {other}"));
            return http::build_405_response(server_name);
        }
    };

    match serve(req.uri.path(), &req.headers, state).await {
        Ok((file, range)) => {
            http::build_file_response(file.data, file.content_type, range, is_head, server_name)
        }
        Err(err) => {
            report(req.uri.path(), &err);
            http::build_error_response(&err, is_head, server_name)
        }
    }
}

async fn serve(
    raw_path: &str,
    headers: &HeaderMap,
    state: &AppState,
) -> Result<(static_files::LoadedFile, ByteRange), ServeError> {
    let path = static_files::decode_path(raw_path)?;
    let target = RequestTarget::classify(&path);
    let file = static_files::load(state, &target).await?;
    logger::log_debug(&format!("{raw_path} -> {}", file.path.display()));

    let range_header = headers.get(RANGE).and_then(|v| v.to_str().ok());
    let range = ByteRange::resolve(range_header, file.data.len());
    Ok((file, range))
}

fn report(raw_path: &str, err: &ServeError) {
    match err {
        ServeError::NotFound => {}
        ServeError::Forbidden => {
            logger::log_warning(&format!("Path traversal attempt blocked: {raw_path}"));
        }
        ServeError::Internal(e) => {
            logger::log_error(&format!("Failed to serve '{raw_path}': {e}"));
        }
    }
}

fn access_entry(
    req: &Parts,
    response: &HttpResponse,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri
            .path_and_query()
            .map_or_else(|| req.uri.path().to_string(), ToString::to_string),
    );
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::StatusCode;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        std::fs::create_dir_all(site.join("img")).unwrap();
        std::fs::write(site.join("index.html"), b"<!doctype html><div id=app></div>").unwrap();
        std::fs::write(site.join("img/logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2, 3]).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();

        let mut cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        cfg.static_files.root = site.to_string_lossy().into_owned();
        cfg.logging.access_log = false;
        (dir, Arc::new(AppState::new(&cfg).unwrap()))
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let resp = handle_request(req, Arc::clone(state), peer).await.unwrap();
        let (parts, body) = resp.into_parts();
        (parts.status, parts.headers, body.collect().await.unwrap().to_bytes())
    }

    #[tokio::test]
    async fn test_extensionless_paths_fall_back_to_index() {
        let (_dir, state) = fixture();
        let (status, headers, root_body) = send(&state, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/html; charset=utf-8");

        for uri in ["/app/dashboard", "/users/42/", "/deep/link?tab=1"] {
            let (status, _, body) = send(&state, Method::GET, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body, root_body, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_file_served_verbatim() {
        let (_dir, state) = fixture();
        let (status, headers, body) = send(&state, Method::GET, "/img/logo.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "image/png");
        assert_eq!(&body[..], &[0x89, b'P', b'N', b'G', 0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_file_is_plain_404() {
        let (_dir, state) = fixture();
        let (status, _, body) = send(&state, Method::GET, "/missing.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");
    }

    #[tokio::test]
    async fn test_traversal_never_leaks() {
        let (_dir, state) = fixture();
        for uri in ["/../secret.txt", "/img/../../secret.txt", "/%2e%2e/secret.txt"] {
            let (status, _, body) = send(&state, Method::GET, uri).await;
            assert!(
                status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND,
                "{uri}: {status}"
            );
            assert_ne!(body, "nope", "{uri}");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_plain_500() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, state) = fixture();
        let locked = state.root.join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("a.txt"), b"hidden").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores directory modes
        if std::fs::read_dir(&locked).is_err() {
            let (status, _, body) = send(&state, Method::GET, "/locked/a.txt").await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "Internal Server Error");
        }

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[tokio::test]
    async fn test_head_and_range() {
        let (_dir, state) = fixture();
        let (status, headers, body) = send(&state, Method::HEAD, "/img/logo.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-length"], "8");
        assert!(body.is_empty());

        let req = Request::builder()
            .uri("/img/logo.png")
            .header(RANGE, "bytes=1-3")
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state), "127.0.0.1:1".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "PNG");
    }

    #[tokio::test]
    async fn test_methods() {
        let (_dir, state) = fixture();
        let (status, headers, _) = send(&state, Method::OPTIONS, "/").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers["allow"], "GET, HEAD, OPTIONS");

        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let (status, _, _) = send(&state, method, "/index.html").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        }
    }
}
