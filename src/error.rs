//! Request failure taxonomy
//!
//! Every failure is terminal to its own request and maps to exactly one status code.

use hyper::StatusCode;
use std::io;
use thiserror::Error;

/// Why a file could not be served
#[derive(Debug, Error)]
pub enum ServeError {
    /// Requested file, or the fallback index, does not exist
    #[error("not found")]
    NotFound,
    /// Request resolves outside the root directory
    #[error("path escapes the static root")]
    Forbidden,
    /// Any other filesystem failure (permissions, I/O)
    #[error("I/O error: {0}")]
    Internal(#[source] io::Error),
}

impl ServeError {
    /// Classify a filesystem error: absence is a 404, everything else a 500
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            // NotADirectory: an intermediate component is a regular file
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            _ => Self::Internal(err),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServeError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServeError::Forbidden.status(), StatusCode::FORBIDDEN);
        let internal = ServeError::Internal(io::Error::other("disk on fire"));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_io_classification() {
        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert!(matches!(ServeError::from_io(missing), ServeError::NotFound));

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(ServeError::from_io(denied), ServeError::Internal(_)));
    }
}
