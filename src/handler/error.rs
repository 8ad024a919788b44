//! Per-request failure taxonomy
//!
//! Every variant is answered locally with a response; none of them ends the
//! connection task or touches other requests.

use crate::http::{self, ResponseBody};
use hyper::Response;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Nothing at the resolved path (or it could not be stat'ed)
    #[error("The requested URL {url} was not found")]
    NotFound { url: String },

    /// Reading a directory failed
    #[error("{0}")]
    Listing(#[source] io::Error),

    /// The file vanished or became unreadable between stat and open
    #[error("{0}")]
    Open(#[source] io::Error),
}

impl ServeError {
    pub fn into_response(self) -> Response<ResponseBody> {
        match self {
            Self::NotFound { url } => http::build_404_response(&url),
            Self::Listing(e) => http::build_500_response(&e.to_string()),
            Self::Open(e) => http::build_404_error_response(&e.to_string()),
        }
    }
}
