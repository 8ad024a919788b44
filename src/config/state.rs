// Application state module
// Immutable per-process state shared by every request

use regex::Regex;
use std::path::PathBuf;

use super::types::{CacheConfig, Config};
use super::StartupError;

/// Application state
///
/// Built once at startup and handed to every connection behind an `Arc`.
/// Nothing in here changes while the server runs.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical served directory
    pub root: PathBuf,
    /// Compiled `compression.zip_match`
    pub zip_match: Regex,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, StartupError> {
        let root = std::fs::canonicalize(&config.server.root).map_err(|source| {
            StartupError::Root {
                path: config.server.root.clone(),
                source,
            }
        })?;
        if !root.is_dir() {
            return Err(StartupError::Root {
                path: config.server.root.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a directory",
                ),
            });
        }
        let zip_match = Regex::new(&config.compression.zip_match)?;

        Ok(Self {
            config,
            root,
            zip_match,
        })
    }

    pub const fn cache(&self) -> &CacheConfig {
        &self.config.cache
    }

    /// Whether a file with this extension (leading dot included) is compressible
    pub fn is_compressible(&self, extension: &str) -> bool {
        self.zip_match.is_match(extension)
    }
}
