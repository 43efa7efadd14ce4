use std::sync::Arc;

use crate::config::Config;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence backend. Production: `PgDocumentStore`;
    /// tests swap in the in-memory store behind the same trait.
    pub store: Arc<dyn DocumentStore>,
    /// Kept on state for handlers that need runtime configuration.
    #[allow(dead_code)]
    pub config: Config,
}
