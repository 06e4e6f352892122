//! Graceful shutdown handling.
//!
//! Provides signal handling for clean server shutdown. In-flight requests
//! complete before the process exits; a commit that has started against the
//! store always runs to completion or full rollback regardless of client
//! disconnects.

use tokio::signal;

/// Wait for a shutdown signal (Ctrl-C or SIGTERM).
///
/// This function blocks until a shutdown signal is received.
/// On Unix systems, it also handles SIGTERM for container environments.
#[allow(clippy::expect_used)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        // Safety: If we can't install signal handlers, the process should panic
        // since graceful shutdown is critical for data integrity.
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        // Safety: Same reasoning as above for SIGTERM in container environments.
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
