//! Shared application state for all routes.

use crate::config::AppConfig;
use crate::store::EntityStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: EntityStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: EntityStore, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
