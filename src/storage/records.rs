//! SQLite record store
//!
//! Handles all database interactions for product rows.

use super::{RecordStore, RecordStoreError};
use crate::catalog::models::{NewProduct, Product, ProductChanges, ProductId};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const PRODUCT_COLUMNS: &str = "id, image, title, description, price, stock, created_at, updated_at";

/// Product rows kept in a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Arguments
    /// * `url` - `sqlite:` connection string or bare file path; `sqlite::memory:`
    ///   gives a private in-memory database
    ///
    /// # Returns
    /// * `Ok(SqliteRecordStore)` if successful
    /// * `Err(RecordStoreError)` if connection or migration failed
    pub async fn connect(url: &str) -> Result<Self, RecordStoreError> {
        let connection_string = if url.starts_with("sqlite:") {
            url.to_string()
        } else {
            format!("sqlite:{}", url)
        };
        let in_memory = connection_string.contains(":memory:");

        if !in_memory {
            let file_path = connection_string
                .trim_start_matches("sqlite:")
                .trim_start_matches("//");
            if let Some(parent) = PathBuf::from(file_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        RecordStoreError::Migration(format!(
                            "Failed to create db directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(&connection_string)?.create_if_missing(true);

        // Every connection to `:memory:` is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .min_connections(if in_memory { 1 } else { 0 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        info!("Connected to SQLite database at: {}", connection_string);

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), RecordStoreError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_products.sql");

        let statements: Vec<String> = migration_sql
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("--"))
            .collect::<Vec<_>>()
            .join(" ")
            .split(';')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        for statement in &statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    RecordStoreError::Migration(format!(
                        "{} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, fields: NewProduct) -> Result<Product, RecordStoreError> {
        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (image, title, description, price, stock, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&fields.image)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(fields.stock)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!("Created product: {}", product.id);
        Ok(product)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, RecordStoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(
        &self,
        product: &Product,
        changes: ProductChanges,
    ) -> Result<Product, RecordStoreError> {
        let image = changes.image.as_deref().unwrap_or(&product.image);
        let updated = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET image = ?, title = ?, description = ?, price = ?, stock = ?, updated_at = ? \
             WHERE id = ? RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(image)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(changes.stock)
        .bind(Utc::now())
        .bind(product.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RecordStoreError::Missing(product.id))?;

        debug!("Updated product: {}", updated.id);
        Ok(updated)
    }

    async fn delete(&self, product: &Product) -> Result<(), RecordStoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(product.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::Missing(product.id));
        }

        debug!("Deleted product: {}", product.id);
        Ok(())
    }

    async fn list_paged(
        &self,
        per_page: u32,
        page: u32,
    ) -> Result<(Vec<Product>, u64), RecordStoreError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok((products, u64::try_from(total).unwrap_or(0)))
    }
}
