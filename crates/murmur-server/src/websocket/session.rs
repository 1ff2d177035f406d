//! WebSocket session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use axum::extract::ws::WebSocket;
use futures::StreamExt;
use metrics::{counter, gauge, histogram};
use murmur_recognition::ModelRegistry;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use super::connection::{self, Disconnect};
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};

/// Live connection count shared with `/health`.
#[derive(Clone, Debug, Default)]
pub struct ConnectionCounter(Arc<AtomicUsize>);

impl ConnectionCounter {
    /// Current number of open connections.
    pub fn current(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    fn enter(&self) -> ConnectionGuard {
        let _ = self.0.fetch_add(1, Ordering::Relaxed);
        gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
        ConnectionGuard(self.0.clone())
    }
}

struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let _ = self.0.fetch_sub(1, Ordering::Relaxed);
        gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    }
}

/// Run a recognition session for a connected client.
#[instrument(skip_all, fields(client_id = %client_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    client_id: String,
    registry: Arc<ModelRegistry>,
    connections: ConnectionCounter,
    shutdown: CancellationToken,
) {
    let (ws_tx, ws_rx) = ws.split();

    let connection_start = Instant::now();
    let _guard = connections.enter();
    info!(default_language = registry.default_tag(), "client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);

    let reason = match connection::drive(ws_rx, ws_tx, registry, shutdown).await {
        Ok(disconnect) => {
            if let Disconnect::Transport(ref e) = disconnect {
                info!(error = %e, "client connection lost");
            }
            disconnect.reason()
        }
        Err(e) => {
            error!(error = %e, "session aborted");
            "fatal"
        }
    };

    let duration = connection_start.elapsed().as_secs_f64();
    info!(reason, duration_secs = duration, "client disconnected");
    counter!(WS_DISCONNECTIONS_TOTAL, "reason" => reason).increment(1);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_guards() {
        let counter = ConnectionCounter::default();
        assert_eq!(counter.current(), 0);
        let a = counter.enter();
        let b = counter.enter();
        assert_eq!(counter.current(), 2);
        drop(a);
        assert_eq!(counter.current(), 1);
        drop(b);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn clones_share_the_count() {
        let counter = ConnectionCounter::default();
        let clone = counter.clone();
        let _guard = counter.enter();
        assert_eq!(clone.current(), 1);
    }
}
