//! Signal handling for graceful shutdown

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Resolves once Ctrl+C or SIGTERM arrives
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let terminate = Arc::new(AtomicBool::new(false));

    #[cfg(unix)]
    {
        use anyhow::Context;
        signal_hook::flag::register(signal_hook::consts::SIGTERM, terminate.clone())
            .context("Failed to register SIGTERM handler")?;
    }

    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => error!("Failed to listen for Ctrl+C signal: {}", e),
            },
            _ = wait_for_flag(terminate) => info!("SIGTERM signal received"),
        }

        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

async fn wait_for_flag(flag: Arc<AtomicBool>) {
    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Stop the HTTP server and wait for in-flight requests, bounded by `shutdown_timeout`
pub async fn graceful_shutdown(
    stop_server: oneshot::Sender<()>,
    server_handle: JoinHandle<()>,
    shutdown_timeout: Duration,
) -> Result<()> {
    info!("Starting graceful shutdown...");

    if stop_server.send(()).is_err() {
        warn!("HTTP server already stopped");
    }

    match timeout(shutdown_timeout, server_handle).await {
        Ok(Ok(())) => info!("HTTP server stopped gracefully"),
        Ok(Err(e)) => error!("HTTP server task failed: {}", e),
        Err(_) => warn!("HTTP server did not stop within {:?}, forcing shutdown", shutdown_timeout),
    }

    info!("Graceful shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_graceful_shutdown_stops_task() {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = stop_rx.await;
        });

        graceful_shutdown(stop_tx, handle, Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_graceful_shutdown_times_out() {
        let (stop_tx, _stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(tokio::time::sleep(Duration::from_secs(30)));

        let started = std::time::Instant::now();
        graceful_shutdown(stop_tx, handle, Duration::from_millis(50)).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
