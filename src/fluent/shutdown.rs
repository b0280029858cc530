//! Shutdown on SIGINT / SIGTERM.
//!
//! A single [`CancellationToken`] drives the server lifecycle. A signal (or
//! the owner of [`FluentRouter::cancellation_token`]) cancels it, the server
//! stops accepting connections and drains, and the store is closed once the
//! drain finishes or `shutdown_timeout` runs out.
//!
//! ```text
//! SIGINT / SIGTERM ──► token cancelled ──► drain ──► store.close()
//!                                           │
//!                                           └─ shutdown_timeout elapsed ──► store.close()
//! ```
//!
//! [`FluentRouter::cancellation_token`]: super::FluentRouter::cancellation_token

use {std::time::Duration, tokio::signal, tokio_util::sync::CancellationToken};

/// Cancels `token` on the first termination signal.
///
/// Returns early when the token is cancelled some other way.
pub(crate) async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {}
        signal = termination_signal() => {
            tracing::info!(signal, "Shutdown signal received, draining requests");
            token.cancel();
        }
    }
}

/// Resolves `timeout` after `token` has been cancelled.
pub(crate) async fn drain_deadline(token: CancellationToken, timeout: Duration) {
    token.cancelled().await;
    tokio::time::sleep(timeout).await;
}

async fn termination_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_on_signal_returns_when_cancelled_elsewhere() {
        let token = CancellationToken::new();
        let listener = tokio::spawn(cancel_on_signal(token.clone()));

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), listener)
            .await
            .expect("listener kept waiting")
            .unwrap();
    }

    #[tokio::test]
    async fn test_drain_deadline_waits_for_cancellation() {
        let token = CancellationToken::new();
        let timeout = Duration::from_millis(50);
        let deadline = drain_deadline(token.clone(), timeout);
        tokio::pin!(deadline);

        // Several timeouts pass, but nothing was cancelled yet
        let early = tokio::time::timeout(timeout * 4, &mut deadline).await;
        assert!(early.is_err());

        token.cancel();
        let started = tokio::time::Instant::now();
        deadline.await;
        assert!(started.elapsed() >= timeout);
    }
}
