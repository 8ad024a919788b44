// Server loop module
// Accepts connections until ctrl-c is received

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` and serve each on its own local task.
///
/// Must run inside a `LocalSet`. Returns after ctrl-c; connections already
/// accepted keep running until the runtime shuts down.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            signal = tokio::signal::ctrl_c() => {
                signal?;
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}
