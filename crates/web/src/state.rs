//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::db::Store;
use crate::storage::PhotoStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The store and photo storage
/// are trait objects so tests can swap in in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    store: Arc<dyn Store>,
    photos: Arc<dyn PhotoStorage>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `store` - Shop, review and user data
    /// * `photos` - Uploaded photo storage
    #[must_use]
    pub fn new(config: WebConfig, store: Arc<dyn Store>, photos: Arc<dyn PhotoStorage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                photos,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the data store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the photo storage.
    #[must_use]
    pub fn photos(&self) -> &dyn PhotoStorage {
        self.inner.photos.as_ref()
    }
}
