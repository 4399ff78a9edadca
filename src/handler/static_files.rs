//! Static file serving module
//!
//! Classifies request paths into the index fallback or a direct file reference,
//! resolves them inside the root directory and loads their contents.

use crate::config::AppState;
use crate::error::ServeError;
use crate::http::mime;
use hyper::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What a request path asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// Empty or extensionless path: serve the index document
    Index,
    /// Path with a `.` somewhere: serve `root/<path>`
    File(String),
}

impl RequestTarget {
    /// Classify a decoded request path (leading `/` already removed)
    ///
    /// Any `.` in the full text counts, including one in a directory name.
    pub fn classify(path: &str) -> Self {
        if !path.is_empty() && path.contains('.') {
            Self::File(path.to_string())
        } else {
            Self::Index
        }
    }
}

/// A file read from disk, ready to be sent
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub data: Bytes,
    pub content_type: &'static str,
}

/// Percent-decode the URI path and drop its leading slash
pub fn decode_path(raw: &str) -> Result<String, ServeError> {
    let decoded = urlencoding::decode(raw).map_err(|_| ServeError::NotFound)?;
    if decoded.contains('\0') {
        return Err(ServeError::NotFound);
    }
    Ok(decoded.trim_start_matches('/').to_string())
}

/// Check a relative request path segment by segment before touching the disk
///
/// Empty and `.` segments are dropped; `..` and backslashes are refused outright.
/// A path ending in `/` or `/.` names a directory, never a file.
fn sanitize(relative: &str) -> Result<PathBuf, ServeError> {
    if matches!(relative.rsplit('/').next(), Some("" | ".")) {
        return Err(ServeError::NotFound);
    }
    let mut clean = PathBuf::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ServeError::Forbidden),
            s if s.contains('\\') => return Err(ServeError::Forbidden),
            s => clean.push(s),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(ServeError::NotFound);
    }
    Ok(clean)
}

/// Resolve `candidate` to a regular file inside `root` (both canonical)
async fn confine(root: &Path, candidate: &Path) -> Result<PathBuf, ServeError> {
    let canonical = fs::canonicalize(candidate)
        .await
        .map_err(ServeError::from_io)?;
    // Symlinks may point anywhere; only the canonical form counts
    if !canonical.starts_with(root) {
        return Err(ServeError::Forbidden);
    }
    let meta = fs::metadata(&canonical).await.map_err(ServeError::from_io)?;
    if !meta.is_file() {
        return Err(ServeError::NotFound);
    }
    Ok(canonical)
}

/// Locate the file a target refers to
pub async fn resolve(state: &AppState, target: &RequestTarget) -> Result<PathBuf, ServeError> {
    let candidate = match target {
        RequestTarget::Index => state.root.join(&state.index_file),
        RequestTarget::File(relative) => state.root.join(sanitize(relative)?),
    };
    confine(&state.root, &candidate).await
}

/// Resolve and read a target
pub async fn load(state: &AppState, target: &RequestTarget) -> Result<LoadedFile, ServeError> {
    let path = resolve(state, target).await?;
    let data = fs::read(&path).await.map_err(ServeError::from_io)?;
    let content_type = mime::content_type_for(&path);
    Ok(LoadedFile {
        path,
        data: Bytes::from(data),
        content_type,
    })
}
