// Signal handling module
//
// - SIGINT (Ctrl+C): stop accepting, exit
// - SIGTERM: stop accepting, exit
//
// Other platforms only see Ctrl+C.

use crate::logger;

/// Resolve on Ctrl+C; never resolves if the handler cannot be installed
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_warning(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}

/// Wait for a termination signal and return its name
#[cfg(unix)]
pub async fn wait_for_shutdown() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                () = interrupt() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            }
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            interrupt().await;
            "SIGINT"
        }
    }
}

/// Wait for Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> &'static str {
    interrupt().await;
    "Ctrl+C"
}
