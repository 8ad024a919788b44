// Configuration module entry point
// Loads the static configuration once and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{CacheConfig, Config};

/// Default extensions routed through the compressor
pub const DEFAULT_ZIP_MATCH: &str = r"^\.(css|js|html|txt)$";

/// Errors raised while turning configuration into a runnable server
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid compression pattern: {0}")]
    ZipMatch(#[from] regex::Error),
    #[error("server root '{path}' is not usable: {source}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid listen address '{0}'")]
    Address(String),
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; environment variables prefixed with `STATIC`
    /// (nested keys separated by `__`, e.g. `STATIC_SERVER__PORT`) override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STATIC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.root", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("cache.etag", true)?
            .set_default("cache.last_modified", true)?
            .set_default("cache.cache_control", true)?
            .set_default("cache.expires", true)?
            .set_default("cache.max_age", 600)?
            .set_default("compression.zip_match", DEFAULT_ZIP_MATCH)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| StartupError::Address(addr))
    }
}
