//! Request path resolution
//!
//! Maps a raw request path onto the served directory, and back onto a
//! normalized URL path for links and redirects.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Path, PathBuf};

/// Characters escaped when a name becomes a URL path segment
pub const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Decode `request_path` and walk its segments
///
/// `.` segments and empty segments are dropped; `..` removes the previous
/// segment and is ignored at the top. Returns `None` when the path does not
/// decode to UTF-8.
fn segments(request_path: &str) -> Option<Vec<String>> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;

    let mut segments = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s.to_string()),
        }
    }
    Some(segments)
}

/// Join `root` with the decoded, normalized request path
///
/// The result never leaves `root`.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    resolved.extend(segments(request_path)?);
    Some(resolved)
}

/// Normalized, re-encoded URL of the directory named by `request_path`
///
/// Always starts and ends with a single `/`, so entry names can be appended
/// directly: `//` becomes `/`, `/a/./b//` becomes `/a/b/`.
pub fn directory_url(request_path: &str) -> Option<String> {
    let mut url = String::from("/");
    for segment in segments(request_path)? {
        url.extend(utf8_percent_encode(&segment, SEGMENT));
        url.push('/');
    }
    Some(url)
}
