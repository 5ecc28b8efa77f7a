//! Coordinated stop for the serve loop and its background tasks.
//!
//! A single `CancellationToken` fans out to the axum serve loop and the
//! eviction sweeper. In-flight job tasks are not cancelled; a torn-down
//! process simply leaves their records non-terminal.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long to wait for in-flight requests to drain before giving up.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Fans a stop signal out to the serve loop and the sweeper.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with a fresh token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A token linked to this coordinator; cancelled on [`shutdown`].
    ///
    /// [`shutdown`]: Self::shutdown
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal every holder of a linked token to stop.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Signal shutdown, then wait for `handles` to drain.
    ///
    /// Waits up to `timeout` (default 30 s); tasks still running after
    /// that are abandoned, not aborted.
    pub async fn graceful_shutdown(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        self.shutdown();
        info!(tasks = handles.len(), "draining server tasks");

        let drain = futures::future::join_all(handles);
        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!(
                timeout_secs = timeout.as_secs(),
                "drain timed out, abandoning tasks"
            );
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
