//! HTTP protocol layer module
//!
//! Content types, byte ranges and response builders, independent of how files are located.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::ByteRange;
pub use response::{
    build_405_response, build_error_response, build_file_response, build_options_response,
    HttpResponse,
};
