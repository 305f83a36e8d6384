//! In-memory stores
//!
//! Substitutes for the SQLite and disk stores. Each can be told to fail its
//! writes so the gaps between file and record side effects can be observed.

use super::{FileStore, FileStoreError, RecordStore, RecordStoreError};
use crate::catalog::models::{NewProduct, Product, ProductChanges, ProductId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Rows {
    next_id: ProductId,
    products: BTreeMap<ProductId, Product>,
}

/// Product rows held in a map
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Rows>,
    fail_writes: AtomicBool,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent create/update/delete fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored products
    pub async fn len(&self) -> usize {
        self.rows.read().await.products.len()
    }

    /// Whether the store holds no products
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_writable(&self) -> Result<(), RecordStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RecordStoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, fields: NewProduct) -> Result<Product, RecordStoreError> {
        self.check_writable()?;
        let mut rows = self.rows.write().await;
        rows.next_id += 1;
        let now = Utc::now();
        let product = Product {
            id: rows.next_id,
            image: fields.image,
            title: fields.title,
            description: fields.description,
            price: fields.price,
            stock: fields.stock,
            created_at: now,
            updated_at: now,
        };
        rows.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, RecordStoreError> {
        Ok(self.rows.read().await.products.get(&id).cloned())
    }

    async fn update(
        &self,
        product: &Product,
        changes: ProductChanges,
    ) -> Result<Product, RecordStoreError> {
        self.check_writable()?;
        let mut rows = self.rows.write().await;
        let stored = rows
            .products
            .get_mut(&product.id)
            .ok_or(RecordStoreError::Missing(product.id))?;
        changes.apply_to(stored, Utc::now());
        Ok(stored.clone())
    }

    async fn delete(&self, product: &Product) -> Result<(), RecordStoreError> {
        self.check_writable()?;
        self.rows
            .write()
            .await
            .products
            .remove(&product.id)
            .map(|_| ())
            .ok_or(RecordStoreError::Missing(product.id))
    }

    async fn list_paged(
        &self,
        per_page: u32,
        page: u32,
    ) -> Result<(Vec<Product>, u64), RecordStoreError> {
        let rows = self.rows.read().await;
        let mut products: Vec<&Product> = rows.products.values().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let skip = usize::try_from(page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(per_page as usize);
        let items = products
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok((items, rows.products.len() as u64))
    }
}

/// Files held in a map keyed by `namespace/name`
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryFileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent put fail (or succeed again)
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent delete fail (or succeed again)
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Content of a stored file
    pub async fn get(&self, namespace: &str, name: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(&key(namespace, name)).cloned()
    }

    /// Sorted `namespace/name` keys of every stored file
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

fn key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace.trim_end_matches('/'), name)
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, namespace: &str, name: &str, bytes: &[u8]) -> Result<(), FileStoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(FileStoreError::Unavailable("puts disabled".to_string()));
        }
        if name.is_empty() {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }
        self.files
            .write()
            .await
            .insert(key(namespace, name), bytes.to_vec());
        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), FileStoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(FileStoreError::Unavailable("deletes disabled".to_string()));
        }
        self.files.write().await.remove(&key(namespace, name));
        Ok(())
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, FileStoreError> {
        Ok(self.files.read().await.contains_key(&key(namespace, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(n: usize) -> NewProduct {
        NewProduct {
            image: format!("{n}.png"),
            title: format!("Product {n}"),
            description: "Plain description".to_string(),
            price: 1.0,
            stock: 1.0,
        }
    }

    #[tokio::test]
    async fn test_record_store_ids_and_paging() {
        let store = MemoryRecordStore::new();
        for n in 1..=3 {
            let product = store.create(new_product(n)).await.unwrap();
            assert_eq!(product.id, n as ProductId);
        }

        let (page, total) = store.list_paged(2, 1).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2]);

        let (page, _) = store.list_paged(2, 2).await.unwrap();
        assert_eq!(page.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_record_store_failure_injection() {
        let store = MemoryRecordStore::new();
        let product = store.create(new_product(1)).await.unwrap();

        store.fail_writes(true);
        assert!(store.create(new_product(2)).await.is_err());
        assert!(store.delete(&product).await.is_err());
        assert_eq!(store.len().await, 1);

        store.fail_writes(false);
        store.delete(&product).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let store = MemoryFileStore::new();
        store.put("products", "a.png", b"abc").await.unwrap();
        assert_eq!(store.get("products", "a.png").await, Some(b"abc".to_vec()));
        assert_eq!(store.paths().await, vec!["products/a.png".to_string()]);

        store.delete("products", "a.png").await.unwrap();
        store.delete("products", "a.png").await.unwrap();
        assert!(!store.exists("products", "a.png").await.unwrap());
    }
}
