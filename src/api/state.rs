use std::sync::Arc;

use crate::config::AppConfig;
use crate::net::SessionRegistry;

/// Shared application state passed to all handlers via Axum's State extractor.
pub struct AppState {
    /// Live sessions, written by the session tasks and only read here.
    pub registry: Arc<SessionRegistry>,
    pub config: AppConfig,
    pub start_time: std::time::Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig, registry: Arc<SessionRegistry>) -> SharedState {
        Arc::new(AppState {
            registry,
            config,
            start_time: std::time::Instant::now(),
        })
    }
}
