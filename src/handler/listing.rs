//! Directory listing module
//!
//! Renders an HTML index of one directory with a link per entry.

use crate::handler::error::ServeError;
use crate::handler::path::{self, SEGMENT};
use crate::http::{self, response::escape_html, ResponseBody};
use hyper::Response;
use percent_encoding::utf8_percent_encode;
use std::path::Path;
use tokio::fs;

/// One line of the listing
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Render the listing of `dir`, linking entries under `request_path`
///
/// `request_path` always ends with `/` here: the router redirects
/// directory requests without one before they reach this point.
pub async fn render_directory(
    dir: &Path,
    request_path: &str,
) -> Result<Response<ResponseBody>, ServeError> {
    let entries = read_entries(dir).await.map_err(ServeError::Listing)?;
    Ok(http::build_html_response(render_listing(
        request_path,
        &entries,
    )))
}

/// Read and stat every entry of `dir`, sorted by name
///
/// The directory handle lives only for the duration of this call.
async fn read_entries(dir: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut read_dir = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await? {
        // follows symlinks; an entry that cannot be stat'ed is listed as a file
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|meta| meta.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort();
    Ok(entries)
}

/// Links are joined onto the normalized directory URL, so `//` or `/a/./`
/// never leak into an href.
pub fn render_listing(request_path: &str, entries: &[ListingEntry]) -> String {
    let base = path::directory_url(request_path).unwrap_or_else(|| String::from("/"));
    let mut content = format!("<h1>Index of {}</h1>", escape_html(request_path));
    for entry in entries {
        let mut link = format!("{base}{}", utf8_percent_encode(&entry.name, SEGMENT));
        if entry.is_dir {
            link.push('/');
        }
        content.push_str(&format!(
            "<p><a href='{}'>{}</a></p>",
            escape_html(&link),
            escape_html(&entry.name)
        ));
    }
    content
}
