//! HTTP cache control module
//!
//! Computes the validation headers of a file response (`ETag`,
//! `Last-Modified`, `Cache-Control`, `Expires`) and decides whether a
//! conditional request can be answered with 304.

use crate::config::CacheConfig;
use chrono::{DateTime, TimeDelta, Utc};
use hyper::http::response::Builder;
use std::time::{SystemTime, UNIX_EPOCH};

/// Snapshot of a filesystem stat, valid for one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub modified: SystemTime,
    pub size: u64,
    pub is_dir: bool,
}

impl From<&std::fs::Metadata> for FileMetadata {
    fn from(meta: &std::fs::Metadata) -> Self {
        Self {
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
            size: meta.len(),
            is_dir: meta.is_dir(),
        }
    }
}

/// Generate a weak `ETag` from size and modification time
///
/// Format: `W/"<size hex>-<mtime millis hex>"`. Two different contents with
/// the same size and mtime share a tag.
pub fn generate_etag(size: u64, modified: SystemTime) -> String {
    let mtime_ms = modified
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    format!("W/\"{size:x}-{mtime_ms:x}\"")
}

/// Format a timestamp as an RFC 1123 HTTP date
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Validation headers for one file response; `None` means disabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreshnessHeaders {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub cache_control: Option<String>,
    pub expires: Option<String>,
}

impl FreshnessHeaders {
    pub fn compute(meta: &FileMetadata, config: &CacheConfig, now: DateTime<Utc>) -> Self {
        let etag = config
            .etag
            .then(|| generate_etag(meta.size, meta.modified));
        let last_modified = config
            .last_modified
            .then(|| http_date(DateTime::<Utc>::from(meta.modified)));
        let cache_control = config
            .cache_control
            .then(|| format!("public, max-age={}", config.max_age));
        let expires = config.expires.then(|| {
            let at = i64::try_from(config.max_age)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .and_then(|delta| now.checked_add_signed(delta))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            http_date(at)
        });

        Self {
            etag,
            last_modified,
            cache_control,
            expires,
        }
    }

    /// Whether the client's cached copy is still current
    ///
    /// At least one validator must be sent, and every validator sent must
    /// equal the header we would emit. A validator for a disabled header
    /// never matches.
    pub fn is_fresh(&self, if_none_match: Option<&str>, if_modified_since: Option<&str>) -> bool {
        if if_none_match.is_none() && if_modified_since.is_none() {
            return false;
        }
        if if_none_match.is_some() && if_none_match != self.etag.as_deref() {
            return false;
        }
        if if_modified_since.is_some() && if_modified_since != self.last_modified.as_deref() {
            return false;
        }
        true
    }

    /// Attach the enabled headers to a response builder
    pub fn apply(&self, mut builder: Builder) -> Builder {
        if let Some(ref v) = self.expires {
            builder = builder.header("Expires", v);
        }
        if let Some(ref v) = self.cache_control {
            builder = builder.header("Cache-Control", v);
        }
        if let Some(ref v) = self.last_modified {
            builder = builder.header("Last-Modified", v);
        }
        if let Some(ref v) = self.etag {
            builder = builder.header("ETag", v);
        }
        builder
    }
}
