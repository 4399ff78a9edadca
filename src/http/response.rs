//! HTTP response building module
//!
//! Builders for every response the server emits. Builder failures never panic:
//! they are logged and replaced with an empty response carrying the intended status.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};

use super::range::ByteRange;
use crate::error::ServeError;

pub type HttpResponse = Response<Full<Bytes>>;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build a file response, honoring a resolved byte range
///
/// `HEAD` responses carry the same headers as `GET` with an empty body.
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    range: ByteRange,
    is_head: bool,
    server_name: &str,
) -> HttpResponse {
    let total = data.len();
    let (status, body) = match range {
        ByteRange::Full => (StatusCode::OK, data),
        ByteRange::Partial { start, end } => {
            (StatusCode::PARTIAL_CONTENT, data.slice(start..=end))
        }
        ByteRange::Unsatisfiable => return build_416_response(total, server_name),
    };

    let mut builder = Response::builder()
        .status(status)
        .header(SERVER, server_name)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, body.len())
        .header(ACCEPT_RANGES, "bytes");
    if let ByteRange::Partial { start, end } = range {
        builder = builder.header(CONTENT_RANGE, format!("bytes {start}-{end}/{total}"));
    }

    let body = if is_head { Bytes::new() } else { body };
    builder
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Map a [`ServeError`] to a minimal plain-text response
///
/// The body names only the status; paths and OS error text stay in the error log.
pub fn build_error_response(err: &ServeError, is_head: bool, server_name: &str) -> HttpResponse {
    let status = err.status();
    let text = status.canonical_reason().unwrap_or("Error");
    build_text_response(status, text, is_head, server_name)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(server_name: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(SERVER, server_name)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::from_static(b"Method Not Allowed")))
        .unwrap_or_else(|e| fallback(StatusCode::METHOD_NOT_ALLOWED, &e))
}

/// Build OPTIONS response advertising the served methods
pub fn build_options_response(server_name: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(SERVER, server_name)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::NO_CONTENT, &e))
}

fn build_416_response(total: usize, server_name: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(SERVER, server_name)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_RANGE, format!("bytes */{total}"))
        .body(Full::new(Bytes::from_static(b"Range Not Satisfiable")))
        .unwrap_or_else(|e| fallback(StatusCode::RANGE_NOT_SATISFIABLE, &e))
}

fn build_text_response(
    status: StatusCode,
    text: &'static str,
    is_head: bool,
    server_name: &str,
) -> HttpResponse {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(text.as_bytes())
    };
    Response::builder()
        .status(status)
        .header(SERVER, server_name)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, text.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Log a builder failure and answer with a bare response
fn fallback(status: StatusCode, error: &hyper::http::Error) -> HttpResponse {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}
