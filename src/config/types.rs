// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub cache: CacheConfig,
    pub compression: CompressionConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory every request path is resolved against
    pub root: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (common, combined or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub max_connections: Option<u64>,
}

/// Cache validation headers attached to file responses.
///
/// Each flag toggles one response header; `max_age` is shared by
/// `Cache-Control` and `Expires`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub etag: bool,
    pub last_modified: bool,
    pub cache_control: bool,
    pub expires: bool,
    /// Seconds
    pub max_age: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            etag: true,
            last_modified: true,
            cache_control: true,
            expires: true,
            max_age: 600,
        }
    }
}

/// Compression configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CompressionConfig {
    /// Regular expression tested against the file extension, leading dot included
    pub zip_match: String,
}
