//! Shutdown signals and the bounded graceful window.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Resolves on Ctrl+C, or on SIGTERM where available.
async fn wait_for_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %e,
                    "Failed to install Ctrl+C handler"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %e,
                    "Failed to install SIGTERM handler"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let signal = tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal,
        "Received shutdown signal, initiating graceful shutdown"
    );
}

/// Returns the future handed to axum's graceful shutdown, and a deadline
/// that resolves `timeout` after the signal fired.
///
/// The deadline never resolves if no signal arrives. Websocket connections
/// stay open until the deadline ends the serve future.
pub(super) fn shutdown_signals(
    timeout: Duration,
) -> (impl Future<Output = ()>, impl Future<Output = ()>) {
    let (fired_tx, mut fired_rx) = watch::channel(false);

    let graceful = async move {
        wait_for_signal().await;
        let _ = fired_tx.send(true);
    };

    let deadline = async move {
        if fired_rx.wait_for(|fired| *fired).await.is_err() {
            return std::future::pending().await;
        }
        tokio::time::sleep(timeout).await;
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            timeout_secs = timeout.as_secs(),
            "Shutdown timeout elapsed, dropping remaining connections"
        );
    };

    (graceful, deadline)
}
