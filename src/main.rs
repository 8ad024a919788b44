use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

/// Config file used when no path is given (extension optional)
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path).map_err(config::StartupError::from)?;
    logger::init(&cfg)?;

    // One thread; requests interleave at await points
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(cfg)?);

    let listener = server::create_listener(addr).map_err(|e| {
        logger::log_bind_failed(&addr, &e);
        e
    })?;

    logger::log_server_start(&addr, &state.root, &state.config);

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state))
        .await?;
    Ok(())
}
