//! Application state shared across handlers.

use crate::catalog::Catalog;
use stacks_core::config::AppConfig;
use stacks_metadata::MetadataStore;
use stacks_storage::BlobStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Blob storage backend.
    pub storage: Arc<dyn BlobStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Catalog service over the two stores.
    pub catalog: Catalog,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let catalog = Catalog::new(storage.clone(), metadata.clone());
        Self {
            config: Arc::new(config),
            storage,
            metadata,
            catalog,
        }
    }
}
