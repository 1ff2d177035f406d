//! Graceful shutdown coordination via `CancellationToken`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long [`ShutdownCoordinator::graceful_shutdown`] waits for the
/// serve task returned by `MurmurServer::listen`.
///
/// Upgraded WebSocket sessions run as detached tasks that axum does not
/// track. They watch the same token, send a Close frame and exit on their
/// own; this timeout does not wait for them.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Broadcasts shutdown to the serve task and every open session.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Get a clone of the cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Initiate shutdown.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether a shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the token, then wait up to `timeout` for the serve task to stop
    /// accepting and drain its HTTP connections.
    ///
    /// Returns `false` if the serve task was still running at the deadline.
    pub async fn graceful_shutdown(&self, serve: JoinHandle<()>, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);

        self.shutdown();
        info!(timeout_secs = timeout.as_secs(), "stopping listener");

        match tokio::time::timeout(timeout, serve).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "serve task ended abnormally");
                true
            }
            Err(_) => {
                warn!(?timeout, "listener still draining at shutdown deadline");
                false
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_not_shutting_down() {
        assert!(!ShutdownCoordinator::new().is_shutting_down());
    }

    #[test]
    fn token_propagation() {
        let coord = ShutdownCoordinator::new();
        let t1 = coord.token();
        let t2 = coord.token();
        coord.shutdown();
        coord.shutdown();
        assert!(t1.is_cancelled());
        assert!(t2.is_cancelled());
        assert!(coord.is_shutting_down());
    }

    #[tokio::test]
    async fn graceful_shutdown_waits_for_serve_task() {
        let coord = ShutdownCoordinator::new();
        let token = coord.token();
        let handle = tokio::spawn(async move {
            token.cancelled().await;
        });

        assert!(coord.graceful_shutdown(handle, None).await);
        assert!(coord.is_shutting_down());
    }

    #[tokio::test]
    async fn graceful_shutdown_tolerates_panicked_serve_task() {
        let coord = ShutdownCoordinator::new();
        let handle: JoinHandle<()> = tokio::spawn(async { panic!("serve failed") });
        assert!(coord.graceful_shutdown(handle, None).await);
    }

    #[tokio::test]
    async fn graceful_shutdown_times_out() {
        let coord = ShutdownCoordinator::new();
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(300)).await;
        });

        let drained = coord
            .graceful_shutdown(handle, Some(Duration::from_millis(50)))
            .await;
        assert!(!drained);
        assert!(coord.is_shutting_down());
    }
}
