//! Static file serving module
//!
//! Freshness check, content type, optional compression and the streamed
//! body for a single regular file.

use crate::config::AppState;
use crate::handler::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::{self, body, mime, Encoding, FileMetadata, FreshnessHeaders, ResponseBody};
use chrono::Utc;
use hyper::{Response, StatusCode};
use std::path::Path;
use tokio::fs::File;

/// Serve the file at `path`, already stat'ed as `meta`
///
/// `meta` decides freshness. A full response re-reads metadata from the
/// opened handle, so validators and `Content-Length` describe the bytes
/// actually streamed even if the file changed after the router's stat.
pub async fn render_file(
    state: &AppState,
    path: &Path,
    meta: &FileMetadata,
    ctx: &RequestContext<'_>,
) -> Result<Response<ResponseBody>, ServeError> {
    let freshness = FreshnessHeaders::compute(meta, state.cache(), Utc::now());
    if freshness.is_fresh(ctx.if_none_match, ctx.if_modified_since) {
        return Ok(http::build_304_response(&freshness));
    }

    let file = File::open(path).await.map_err(ServeError::Open)?;
    let opened = file
        .metadata()
        .await
        .map(|m| FileMetadata::from(&m))
        .map_err(ServeError::Open)?;
    let freshness = if opened == *meta {
        freshness
    } else {
        FreshnessHeaders::compute(&opened, state.cache(), Utc::now())
    };

    let extension = path.extension().and_then(|e| e.to_str());
    let dotted = extension.map(|e| format!(".{e}")).unwrap_or_default();
    let encoding = if state.is_compressible(&dotted) {
        Encoding::negotiate(ctx.accept_encoding)
    } else {
        None
    };

    let mut builder = freshness
        .apply(Response::builder().status(StatusCode::OK))
        .header("Content-Type", mime::get_content_type(extension));
    builder = match encoding {
        Some(encoding) => builder.header("Content-Encoding", encoding.as_str()),
        None => builder.header("Content-Length", opened.size),
    };

    let body = body::file(file, encoding.map(Encoding::compressor));
    Ok(builder
        .body(body)
        .unwrap_or_else(|e| http::response::fallback("200", &e)))
}
