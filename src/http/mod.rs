//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! filesystem dispatch in `handler`.

pub mod body;
pub mod cache;
pub mod encoding;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use cache::{FileMetadata, FreshnessHeaders};
pub use encoding::Encoding;
pub use response::{
    build_301_response, build_304_response, build_404_error_response, build_404_response,
    build_405_response, build_500_response, build_html_response,
};
