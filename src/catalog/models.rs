//! Product data models
//!
//! Defines the persisted product entity, the field sets used to create and
//! update it, and the paginated listing returned to views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Unique identifier for a product, assigned by the record store
pub type ProductId = i64;

/// Number of products shown on one listing page
pub const PER_PAGE: u32 = 10;

/// A catalog entry with its single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    /// Unique identifier for the product
    pub id: ProductId,
    /// Storage-relative filename of the product image
    pub image: String,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: f64,
    /// When the product was created
    pub created_at: DateTime<Utc>,
    /// When the product was last updated
    pub updated_at: DateTime<Utc>,
}

/// Fields for a product that does not exist yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Generated filename of the already-stored image
    pub image: String,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: f64,
}

/// Full replacement of a product's fields
///
/// `image` is `None` when the stored image should be kept as it is.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChanges {
    /// Replacement image filename, if a new image was stored
    pub image: Option<String>,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: f64,
}

impl ProductChanges {
    /// Apply the changes to a product in place, stamping `updated_at`
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
        product.title = self.title.clone();
        product.description = self.description.clone();
        product.price = self.price;
        product.stock = self.stock;
        product.updated_at = now;
    }
}

/// One page of a listing plus what a pager needs to render
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Total number of items across all pages
    pub total: u64,
    /// Page size
    pub per_page: u32,
    /// 1-based page number
    pub current_page: u32,
    /// Last page number (1 when there are no items)
    pub last_page: u32,
}

impl<T> Page<T> {
    /// Build a page from the items and the total row count
    pub fn new(data: Vec<T>, total: u64, per_page: u32, current_page: u32) -> Self {
        let per_page = per_page.max(1);
        let last_page = u32::try_from(total.div_ceil(u64::from(per_page)))
            .unwrap_or(u32::MAX)
            .max(1);
        Self {
            data,
            total,
            per_page,
            current_page,
            last_page,
        }
    }
}

/// Normalize a requested page number: anything missing or below 1 is page 1
pub fn normalize_page(page: Option<u32>) -> u32 {
    page.filter(|p| *p >= 1).unwrap_or(1)
}
