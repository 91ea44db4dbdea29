//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use throttle::{MemoryStore, SharedStore};
use tracing::debug;

use crate::config::ApiConfig;
use crate::handler::SubmissionHandler;
use crate::nonce::NonceGuard;

/// Default interval between expired-entry sweeps (5 minutes).
pub const STORE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Submission pipeline
    pub handler: Arc<SubmissionHandler>,
    /// Form token issuer
    pub nonce: Arc<NonceGuard>,
    pub config: Arc<ApiConfig>,
    /// Throttle backing store, checked by health endpoints
    pub store: SharedStore,
}

impl AppState {
    pub fn new(handler: SubmissionHandler, store: SharedStore, config: ApiConfig) -> Self {
        let nonce = NonceGuard::new(
            config.security.nonce_secret.clone(),
            config.security.nonce_lifetime_secs,
        );
        Self::with_nonce(handler, store, config, nonce)
    }

    /// Create with a custom token issuer.
    pub fn with_nonce(
        handler: SubmissionHandler,
        store: SharedStore,
        config: ApiConfig,
        nonce: NonceGuard,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            nonce: Arc::new(nonce),
            config: Arc::new(config),
            store,
        }
    }
}

/// Start the background task that drops expired throttle entries.
/// Returns a handle that can be used to cancel the task.
pub fn start_store_cleanup(store: Arc<MemoryStore>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = store.purge_expired();
            metrics().store_entries.set(store.len() as u64);
            if removed > 0 {
                debug!(removed, "Purged expired throttle entries");
            }
        }
    })
}
