//! HTTP response building module
//!
//! Builders for the fixed-body responses the server produces.

use crate::http::body::{self, ResponseBody};
use crate::http::cache::FreshnessHeaders;
use bytes::Bytes;
use hyper::{Response, StatusCode};

/// Escape text for inclusion in HTML content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build 200 HTML response
pub fn build_html_response(content: String) -> Response<ResponseBody> {
    let content_length = content.len();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html")
        .header("Content-Length", content_length)
        .body(body::full(content))
        .unwrap_or_else(|e| fallback("HTML", &e))
}

/// Build 301 redirect to `location`
pub fn build_301_response(location: &str) -> Response<ResponseBody> {
    let escaped = escape_html(location);
    let content = format!("Redirecting to <a href='{escaped}'>{escaped}</a>");
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header("Location", location)
        .header("Content-Type", "text/html")
        .header("Content-Length", content.len())
        .body(body::full(content))
        .unwrap_or_else(|e| fallback("301", &e))
}

/// Build 304 Not Modified response carrying the current validators
pub fn build_304_response(freshness: &FreshnessHeaders) -> Response<ResponseBody> {
    freshness
        .apply(Response::builder().status(StatusCode::NOT_MODIFIED))
        .body(body::empty())
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 404 page naming the URL that was requested
pub fn build_404_response(url: &str) -> Response<ResponseBody> {
    let content = format!(
        "<h1>Not Found</h1><p>The requested URL {} was not found on this server.</p>",
        escape_html(url)
    );
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/html")
        .header("Content-Length", content.len())
        .body(body::full(content))
        .unwrap_or_else(|e| fallback("404", &e))
}

/// Build 404 with a raw error description as body
pub fn build_404_error_response(error: &str) -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, error)
}

/// Build 500 with a raw error description as body
pub fn build_500_response(error: &str) -> Response<ResponseBody> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, error)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD")
        .body(body::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| fallback("405", &e))
}

fn build_text_response(status: StatusCode, text: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .header("Content-Length", text.len())
        .body(body::full(Bytes::copy_from_slice(text.as_bytes())))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Log response build error and fall back to an empty 500
pub fn fallback(status: &str, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
