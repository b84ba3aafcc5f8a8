use std::sync::Arc;

use crate::cache::DocumentResolver;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the process-wide resume cache; every handler reads through it.
    pub resolver: Arc<DocumentResolver>,
}
