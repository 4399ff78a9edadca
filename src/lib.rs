//! Static file server for single-page applications.
//!
//! Requests whose path contains a `.` are served from the root directory;
//! every other path gets the index document so client-side routing can take over.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
