//! Request handler module
//!
//! Maps request paths onto the served directory and renders listings,
//! redirects and file responses.

pub mod error;
pub mod file;
pub mod listing;
pub mod path;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
