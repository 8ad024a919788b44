//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

/// Content type used when the extension is missing or unknown
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Get MIME Content-Type based on file extension (without the dot)
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("css") => "text/css",
        Some("gif") => "image/gif",
        Some("html") => "text/html",
        Some("ico") => "image/x-ico",
        Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
