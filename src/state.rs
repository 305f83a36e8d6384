//! Application state
//!
//! Shared handles passed to every request handler.

use crate::catalog::ProductService;
use crate::config::Config;
use crate::error::AppError;
use crate::storage::{FileStore, LocalFileStore, RecordStore, SqliteRecordStore};
use std::sync::Arc;
use tracing::info;

/// State shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Product operations
    pub products: Arc<ProductService>,
}

impl AppState {
    /// Build state over explicit stores
    pub fn new(records: Arc<dyn RecordStore>, files: Arc<dyn FileStore>) -> Self {
        Self {
            products: Arc::new(ProductService::new(records, files)),
        }
    }

    /// Open the SQLite database and the local file store named by the config
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let records = SqliteRecordStore::connect(&config.database.url).await?;
        let files = LocalFileStore::new(config.storage.root.clone());
        info!(
            storage_root = %files.root().display(),
            "Product images stored on local disk"
        );
        Ok(Self::new(Arc::new(records), Arc::new(files)))
    }
}
