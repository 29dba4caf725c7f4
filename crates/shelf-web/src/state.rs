//! Application state.

use shelf_core::ShelfConfig;
use shelf_store::Database;
use std::sync::Arc;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The loaded configuration.
    config: ShelfConfig,
    /// Product, user and session storage.
    db: Database,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: ShelfConfig, db: Database) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, db }),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ShelfConfig {
        &self.inner.config
    }

    /// Get the database handle.
    pub fn db(&self) -> &Database {
        &self.inner.db
    }
}
