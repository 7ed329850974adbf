// Server loop module
// Accepts connections until the shutdown signal fires

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::{accept_connection, ConnectionSettings};
use crate::handler::Router;
use crate::logger;

/// Serve until Ctrl+C
pub async fn run(
    listener: TcpListener,
    router: Arc<Router>,
    settings: ConnectionSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    run_until(listener, router, settings, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_error(&format!("Failed to listen for shutdown signal: {e}"));
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Accept connections until `shutdown` completes.
///
/// Connections already being served keep running on their own tasks.
#[allow(clippy::ignored_unit_patterns)]
pub async fn run_until<S>(
    listener: TcpListener,
    router: Arc<Router>,
    settings: ConnectionSettings,
    shutdown: S,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &router, settings, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = &mut shutdown => {
                logger::log_server_stop();
                return Ok(());
            }
        }
    }
}
