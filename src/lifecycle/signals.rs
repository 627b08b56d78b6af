//! OS signal handling.

use tokio::sync::broadcast;

/// Resolves on Ctrl+C or when the shutdown coordinator fires.
pub async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                // Fall back to the coordinator alone.
                let _ = shutdown.recv().await;
            }
            tracing::info!("Shutdown signal received");
        }
        _ = shutdown.recv() => {
            tracing::info!("Shutdown requested");
        }
    }
}
