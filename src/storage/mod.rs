//! Storage layer
//!
//! The product service talks to two collaborators through the traits defined
//! here: a [`RecordStore`] for product rows and a [`FileStore`] for uploaded
//! image bytes. Both are injected as trait objects so tests can substitute the
//! in-memory implementations from [`memory`].

pub mod files;
pub mod memory;
pub mod records;

use crate::catalog::models::{NewProduct, Product, ProductChanges, ProductId};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use files::{hash_name, LocalFileStore};
pub use memory::{MemoryFileStore, MemoryRecordStore};
pub use records::SqliteRecordStore;

/// Errors raised by a record store
#[derive(Error, Debug)]
pub enum RecordStoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed at startup
    #[error("Migration failed: {0}")]
    Migration(String),

    /// The row being written disappeared between lookup and write
    #[error("Product {0} no longer exists")]
    Missing(ProductId),

    /// Store refused the operation (used by test doubles)
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a file store
#[derive(Error, Debug)]
pub enum FileStoreError {
    /// Namespace or file name would escape the storage root
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    /// Filesystem failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Store refused the operation (used by test doubles)
    #[error("File store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for product rows
///
/// All implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new product; the store assigns `id` and both timestamps
    async fn create(&self, fields: NewProduct) -> Result<Product, RecordStoreError>;

    /// Look up a product by id
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RecordStoreError>;

    /// Replace a product's fields, stamping `updated_at`
    async fn update(
        &self,
        product: &Product,
        changes: ProductChanges,
    ) -> Result<Product, RecordStoreError>;

    /// Remove a product row
    async fn delete(&self, product: &Product) -> Result<(), RecordStoreError>;

    /// One page of products, newest first, plus the total row count
    ///
    /// # Arguments
    /// * `per_page` - Page size
    /// * `page` - 1-based page number
    async fn list_paged(
        &self,
        per_page: u32,
        page: u32,
    ) -> Result<(Vec<Product>, u64), RecordStoreError>;
}

/// Persistence for binary blobs, namespaced by directory
///
/// All implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` as `namespace/name`, replacing any existing file
    async fn put(&self, namespace: &str, name: &str, bytes: &[u8]) -> Result<(), FileStoreError>;

    /// Delete `namespace/name`
    ///
    /// # Notes
    /// Does not fail if the file doesn't exist or the name is empty.
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), FileStoreError>;

    /// Check whether `namespace/name` exists
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, FileStoreError>;
}
