use tokio_util::sync::CancellationToken;

/// Turns SIGINT (Ctrl+C) and SIGTERM into a shutdown request.
///
/// Spawn `listen()` on the runtime; whoever owns the event loop waits on a
/// `token()` clone and exits when it is cancelled. The Quit menu action goes
/// through the same token via `shutdown()`.
#[derive(Clone)]
pub struct SignalHandler {
    token: CancellationToken,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Returns a clone of the cancellation token for sharing with subsystems.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request shutdown without a signal.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Waits for SIGINT, SIGTERM or an explicit `shutdown()`, then cancels
    /// the token.
    pub async fn listen(&self) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT, shutting down...");
            }
            _ = Self::sigterm() => {
                tracing::info!("Received SIGTERM, shutting down...");
            }
            _ = self.token.cancelled() => {
                tracing::debug!("Shutdown requested");
            }
        }
        self.token.cancel();
    }

    #[cfg(unix)]
    async fn sigterm() {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    async fn sigterm() {
        std::future::pending::<()>().await;
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
