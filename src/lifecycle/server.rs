//! HTTP server task with an external stop handle

use axum::Router;
use tokio::{net::TcpListener, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Lets the shutdown sequence stop a running [`serve`] and wait for it.
#[derive(Clone, Debug, Default)]
pub struct ServerHandle {
    shutdown: CancellationToken,
    stopped: CancellationToken,
}

impl ServerHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops accepting connections and waits for in-flight requests until
    /// `deadline`. Returns `false` if the server was still draining then.
    pub async fn stop(&self, deadline: Instant) -> bool {
        self.shutdown.cancel();
        tokio::time::timeout_at(deadline, self.stopped.cancelled())
            .await
            .is_ok()
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.is_cancelled()
    }
}

/// Serves `app` on `listener` until the handle is stopped or accepting
/// fails.
pub async fn serve(listener: TcpListener, app: Router, handle: ServerHandle) -> std::io::Result<()> {
    let shutdown = handle.shutdown.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

    handle.stopped.cancel();
    info!("HTTP server stopped");
    result
}
