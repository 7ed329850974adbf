// Connection handling module
// Serves one accepted TCP connection on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::PerformanceConfig;
use crate::handler::{self, Router};
use crate::logger;

/// Per-connection limits taken from the performance configuration
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub keep_alive: bool,
    /// Upper bound on a connection's lifetime; `None` disables it
    pub timeout: Option<Duration>,
    pub max_connections: Option<usize>,
}

impl From<&PerformanceConfig> for ConnectionSettings {
    fn from(config: &PerformanceConfig) -> Self {
        Self {
            keep_alive: config.keep_alive,
            timeout: (config.connection_timeout > 0)
                .then(|| Duration::from_secs(config.connection_timeout)),
            max_connections: config.max_connections,
        }
    }
}

/// Accept a connection, enforcing the connection cap.
///
/// Returns `false` when the connection was rejected.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: &Arc<Router>,
    settings: ConnectionSettings,
    conn_counter: &Arc<AtomicUsize>,
) -> bool {
    // Increment first, then check, so concurrent accepts cannot overshoot
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = settings.max_connections {
        if prev_count >= max_conn {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return false;
        }
    }

    logger::log_debug(&format!("Accepted connection from {peer_addr}"));
    handle_connection(
        stream,
        peer_addr,
        Arc::clone(router),
        settings,
        Arc::clone(conn_counter),
    );
    true
}

/// Serve HTTP/1.1 on the stream in a spawned task, then release its slot
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: Arc<Router>,
    settings: ConnectionSettings,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(settings.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&router), peer_addr)),
        );

        let result = match settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, conn).await {
                Ok(result) => result,
                Err(_) => {
                    logger::log_warning(&format!(
                        "Connection from {peer_addr} timed out after {} seconds",
                        limit.as_secs()
                    ));
                    Ok(())
                }
            },
            None => conn.await,
        };

        if let Err(err) = result {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
