//! Request handler module
//!
//! Turns a request path into either the index fallback or a file under the
//! static root, and serves it.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
pub use static_files::RequestTarget;
