//! Process signal handling

use tracing::{info, warn};

/// Completes when the process receives Ctrl-C, or SIGTERM on Unix.
///
/// If a handler cannot be installed that signal is ignored and a warning is
/// logged; the other signal still works.
pub async fn shutdown_signal() {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received interrupt signal"),
            Err(e) => {
                warn!("Unable to listen for interrupt signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal");
            }
            Err(e) => {
                warn!("Unable to listen for terminate signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}
