//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method check, path resolution,
//! stat, and dispatch to listing, redirect or file serving.

use crate::config::AppState;
use crate::handler::error::ServeError;
use crate::handler::{file, listing, path};
use crate::http::{self, body, FileMetadata, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Path component of the request target, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub accept_encoding: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: *req.method() == Method::HEAD,
            accept_encoding: header_str(req, "accept-encoding"),
            if_none_match: header_str(req, "if-none-match"),
            if_modified_since: header_str(req, "if-modified-since"),
        }
    }

    /// The URL as requested, query included
    pub fn url(&self) -> String {
        match self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.to_string(),
        }
    }
}

fn header_str<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let response = if matches!(*req.method(), Method::GET | Method::HEAD) {
        route(&ctx, &state).await
    } else {
        logger::log_warning(&format!("Method not allowed: {}", req.method()));
        http::build_405_response()
    };

    // HEAD keeps status and headers; dropping the body closes any open file
    let response = if ctx.is_head {
        response.map(|_| body::empty())
    } else {
        response
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(remote_addr, req.method().as_str(), ctx.url());
        entry.complete(&req, &response, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve, stat and dispatch one GET/HEAD request
pub async fn route(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    dispatch(ctx, state).await.unwrap_or_else(|e| {
        match &e {
            ServeError::NotFound { .. } => logger::log_debug(&e.to_string()),
            _ => logger::log_warning(&format!("{} -> {e}", ctx.url())),
        }
        e.into_response()
    })
}

async fn dispatch(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Result<Response<ResponseBody>, ServeError> {
    let not_found = || ServeError::NotFound { url: ctx.url() };

    let resolved = path::resolve(&state.root, ctx.path).ok_or_else(not_found)?;
    let meta = fs::metadata(&resolved)
        .await
        .map(|m| FileMetadata::from(&m))
        .map_err(|_| not_found())?;

    let has_trailing_slash = ctx.path.ends_with('/');
    match (meta.is_dir, has_trailing_slash) {
        (true, true) => listing::render_directory(&resolved, ctx.path).await,
        (true, false) => redirect_location(ctx)
            .map(|location| http::build_301_response(&location))
            .ok_or_else(not_found),
        // a regular file is not a directory: `/index.html/` does not exist
        (false, true) => Err(not_found()),
        (false, false) => file::render_file(state, &resolved, &meta, ctx).await,
    }
}

/// Normalized path with one trailing slash, query preserved
///
/// Repeated leading slashes are collapsed so the location stays on this host.
fn redirect_location(ctx: &RequestContext<'_>) -> Option<String> {
    let dir = path::directory_url(ctx.path)?;
    Some(match ctx.query {
        Some(q) => format!("{dir}?{q}"),
        None => dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use flate2::read::{GzDecoder, ZlibDecoder};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use std::io::Read;
    use tempfile::TempDir;

    const INDEX: &str = "<p>hi</p>\n";

    /// Root with `index.html` (10 bytes), `images/` and a compressible stylesheet
    fn fixture() -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images").join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::write(dir.path().join("site.css"), "body { color: red; }\n".repeat(200)).unwrap();

        let mut cfg = Config::load_from("does-not-exist/static-server").unwrap();
        cfg.server.root = dir.path().to_str().unwrap().to_string();
        cfg.logging.access_log = false;
        let state = Arc::new(AppState::new(cfg).unwrap());
        (dir, state)
    }

    fn get(uri: &str) -> hyper::http::request::Builder {
        Request::builder().method(Method::GET).uri(uri)
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<ResponseBody> {
        let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_request(req, Arc::clone(state), addr).await.unwrap()
    }

    async fn body_bytes(response: Response<ResponseBody>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_missing_path_is_404_naming_url() {
        let (_dir, state) = fixture();
        let response = send(&state, get("/nope.html").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.contains("/nope.html"));
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let (_dir, state) = fixture();
        let response = send(&state, get("/images").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()["Location"], "/images/");
    }

    #[tokio::test]
    async fn test_redirect_keeps_query() {
        let (_dir, state) = fixture();
        let response = send(&state, get("/images?sort=name").body(()).unwrap()).await;
        assert_eq!(response.headers()["Location"], "/images/?sort=name");
    }

    #[tokio::test]
    async fn test_redirect_location_is_normalized() {
        let (dir, state) = fixture();
        std::fs::create_dir(dir.path().join("evil.example")).unwrap();

        let response = send(&state, get("//evil.example").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()["Location"], "/evil.example/");

        let response = send(&state, get("/./images").body(()).unwrap()).await;
        assert_eq!(response.headers()["Location"], "/images/");
    }

    #[tokio::test]
    async fn test_double_slash_listing_links_stay_on_host() {
        let (_dir, state) = fixture();
        let response = send(&state, get("//").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<p><a href='/index.html'>index.html</a></p>"));
        assert!(html.contains("<p><a href='/images/'>images</a></p>"));
        assert!(!html.contains("href='//"));
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_404() {
        let (_dir, state) = fixture();
        let response = send(&state, get("/index.html/").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.contains("/index.html/"));
    }

    #[tokio::test]
    async fn test_root_listing_links_every_entry() {
        let (_dir, state) = fixture();
        let response = send(&state, get("/").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<h1>Index of /</h1>"));
        assert!(html.contains("href='/index.html'"));
        assert!(html.contains("href='/images/'"));
        assert!(html.contains("href='/site.css'"));
        assert_eq!(html.matches("<a href=").count(), 3);
    }

    #[tokio::test]
    async fn test_nested_listing_links_are_absolute() {
        let (_dir, state) = fixture();
        let response = send(&state, get("/images/").body(()).unwrap()).await;
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<p><a href='/images/logo.png'>logo.png</a></p>"));
    }

    #[tokio::test]
    async fn test_file_without_accept_encoding_is_identical() {
        let (_dir, state) = fixture();
        let response = send(&state, get("/index.html").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["Content-Type"], "text/html");
        assert_eq!(headers["Content-Length"], "10");
        assert!(headers.get("Content-Encoding").is_none());
        assert!(headers.get("ETag").is_some());
        assert!(headers.get("Last-Modified").is_some());
        assert_eq!(headers["Cache-Control"], "public, max-age=600");
        assert!(headers.get("Expires").is_some());
        assert_eq!(body_bytes(response).await, INDEX.as_bytes());
    }

    #[tokio::test]
    async fn test_gzip_has_precedence() {
        let (dir, state) = fixture();
        let req = get("/site.css")
            .header("accept-encoding", "gzip, deflate")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.headers()["Content-Encoding"], "gzip");
        assert!(response.headers().get("Content-Length").is_none());

        let encoded = body_bytes(response).await;
        let mut decoded = Vec::new();
        GzDecoder::new(encoded.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, std::fs::read(dir.path().join("site.css")).unwrap());
    }

    #[tokio::test]
    async fn test_deflate_only() {
        let (dir, state) = fixture();
        let req = get("/site.css")
            .header("accept-encoding", "deflate")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.headers()["Content-Encoding"], "deflate");

        let encoded = body_bytes(response).await;
        let mut decoded = Vec::new();
        ZlibDecoder::new(encoded.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, std::fs::read(dir.path().join("site.css")).unwrap());
    }

    #[tokio::test]
    async fn test_incompressible_extension_is_not_encoded() {
        let (_dir, state) = fixture();
        let req = get("/images/logo.png")
            .header("accept-encoding", "gzip")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.headers()["Content-Type"], "image/png");
        assert!(response.headers().get("Content-Encoding").is_none());
        assert_eq!(body_bytes(response).await, [0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_matching_etag_is_304() {
        let (_dir, state) = fixture();
        let first = send(&state, get("/index.html").body(()).unwrap()).await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let req = get("/index.html")
            .header("if-none-match", &etag)
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()["ETag"], etag.as_str());
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_matching_last_modified_is_304() {
        let (_dir, state) = fixture();
        let first = send(&state, get("/index.html").body(()).unwrap()).await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();
        let last_modified = first.headers()["Last-Modified"].to_str().unwrap().to_string();

        let req = get("/index.html")
            .header("if-none-match", &etag)
            .header("if-modified-since", &last_modified)
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_stale_etag_gets_full_response() {
        let (_dir, state) = fixture();
        let req = get("/index.html")
            .header("if-none-match", "W/\"0-0\"")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_ne!(response.headers()["ETag"], "W/\"0-0\"");
        assert_eq!(body_bytes(response).await, INDEX.as_bytes());
    }

    #[tokio::test]
    async fn test_mismatched_if_modified_since_gets_full_response() {
        let (_dir, state) = fixture();
        let first = send(&state, get("/index.html").body(()).unwrap()).await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let req = get("/index.html")
            .header("if-none-match", &etag)
            .header("if-modified-since", "Mon, 01 Jan 2001 00:00:00 GMT")
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_traversal_cannot_escape_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("public");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();

        let mut cfg = Config::load_from("does-not-exist/static-server").unwrap();
        cfg.server.root = root.to_str().unwrap().to_string();
        cfg.logging.access_log = false;
        let state = Arc::new(AppState::new(cfg).unwrap());

        for uri in ["/../secret.txt", "/%2e%2e/secret.txt", "/a/../../secret.txt"] {
            let response = send(&state, get(uri).body(()).unwrap()).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let (_dir, state) = fixture();
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/index.html")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Length"], "10");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let (_dir, state) = fixture();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/index.html")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_file_removed_after_stat_is_404() {
        let (dir, state) = fixture();
        let path = dir.path().join("index.html");
        let meta = FileMetadata::from(&std::fs::metadata(&path).unwrap());
        std::fs::remove_file(&path).unwrap();

        let req = get("/index.html").body(()).unwrap();
        let ctx = RequestContext::from_request(&req);
        let err = file::render_file(&state, &path, &meta, &ctx).await.unwrap_err();
        assert!(matches!(err, ServeError::Open(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_file_changed_after_stat_reports_served_length() {
        let (dir, state) = fixture();
        let path = dir.path().join("index.html");
        let meta = FileMetadata::from(&std::fs::metadata(&path).unwrap());
        let grown = "<p>grown after stat</p>\n";
        std::fs::write(&path, grown).unwrap();

        let req = get("/index.html").body(()).unwrap();
        let ctx = RequestContext::from_request(&req);
        let response = file::render_file(&state, &path, &meta, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let served = FileMetadata::from(&std::fs::metadata(&path).unwrap());
        let expected_etag = http::cache::generate_etag(served.size, served.modified);
        assert_eq!(response.headers()["Content-Length"], grown.len().to_string().as_str());
        assert_eq!(response.headers()["ETag"], expected_etag.as_str());
        assert_eq!(body_bytes(response).await, grown.as_bytes());
    }
}
