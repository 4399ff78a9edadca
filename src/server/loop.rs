// Server loop module
// The long-lived server value: bound listener plus shared state

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::listener::create_listener;
use crate::config::AppState;
use crate::logger;

/// Pause after a failed accept (e.g. fd exhaustion) before retrying
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound server, built once at startup
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the configured address
    pub fn bind(state: Arc<AppState>) -> std::io::Result<Self> {
        let addr = state
            .config
            .socket_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let listener = create_listener(addr, state.config.server.backlog)?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// `shutdown` yields a short reason for the log. Connections already handed
    /// to their tasks keep running; the accept loop just stops.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = &'static str>,
    {
        let Self { listener, state } = self;
        let active_connections = Arc::new(AtomicUsize::new(0));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            accept_connection(stream, peer_addr, &state, &active_connections);
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }

                reason = &mut shutdown => {
                    logger::log_shutdown(reason);
                    return;
                }
            }
        }
    }
}
