//! Shared application state for Axum routers.

use axum::extract::FromRef;
use rolodex_storage::SharedStore;
use std::sync::Arc;

use crate::config::ApiConfig;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The contact store, opened once at startup.
    pub store: SharedStore,
    pub config: Arc<ApiConfig>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(store: SharedStore, config: ApiConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for std::time::Instant {
    fn from_ref(state: &AppState) -> Self {
        state.start_time
    }
}
