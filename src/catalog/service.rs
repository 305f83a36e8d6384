//! Product service
//!
//! All catalog decision logic lives here. Each mutating operation validates
//! first, then runs its side effects as separate, logged steps against the
//! injected stores. There is no transaction spanning the file store and the
//! record store: if a later step fails, earlier steps are not undone.

use crate::catalog::models::{
    normalize_page, NewProduct, Page, Product, ProductChanges, ProductId, PER_PAGE,
};
use crate::catalog::validation::{validate, ImageRule, ProductForm, ValidImage};
use crate::error::AppError;
use crate::storage::{hash_name, FileStore, RecordStore};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Namespace (directory) of product images in the file store
pub const IMAGE_NAMESPACE: &str = "products";

/// Product CRUD operations over a record store and a file store
#[derive(Clone)]
pub struct ProductService {
    records: Arc<dyn RecordStore>,
    files: Arc<dyn FileStore>,
}

impl fmt::Debug for ProductService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductService").finish_non_exhaustive()
    }
}

impl ProductService {
    /// Create a service over the given stores
    pub fn new(records: Arc<dyn RecordStore>, files: Arc<dyn FileStore>) -> Self {
        Self { records, files }
    }

    /// One page of products, newest first
    ///
    /// # Arguments
    /// * `page` - Requested 1-based page; missing or zero means the first page
    #[instrument(name = "products::list", skip(self))]
    pub async fn list(&self, page: Option<u32>) -> Result<Page<Product>, AppError> {
        let page = normalize_page(page);
        let (items, total) = self.records.list_paged(PER_PAGE, page).await?;
        debug!(count = items.len(), total, "Listed products");
        Ok(Page::new(items, total, PER_PAGE, page))
    }

    /// Look up one product
    ///
    /// # Returns
    /// * `Ok(Product)` - The product
    /// * `Err(AppError::ProductNotFound)` - No product has this id
    #[instrument(name = "products::find", skip(self))]
    pub async fn find(&self, id: ProductId) -> Result<Product, AppError> {
        self.records
            .find(id)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(id.to_string()))
    }

    /// Create a product from a submitted form
    ///
    /// Steps: validate (no side effects on failure), store the image, insert
    /// the row. A failed insert leaves the stored image behind.
    #[instrument(name = "products::store", skip_all)]
    pub async fn store(&self, form: ProductForm) -> Result<Product, AppError> {
        let validated = validate(form, ImageRule::Required)?;
        let image = validated
            .image
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Validated form lost its image")))?;

        let image_name = self.put_image(&image).await?;

        let product = self
            .records
            .create(NewProduct {
                image: image_name,
                title: validated.title,
                description: validated.description,
                price: validated.price,
                stock: validated.stock,
            })
            .await?;

        info!(product_id = product.id, image = %product.image, "Created product");
        Ok(product)
    }

    /// Replace a product's fields from a submitted form
    ///
    /// The product is looked up before the form is checked, so an unknown id
    /// is reported as not found whatever the body holds. With a new image the
    /// new file is written first and the previous one deleted afterwards.
    #[instrument(name = "products::update", skip(self, form))]
    pub async fn update(&self, id: ProductId, form: ProductForm) -> Result<Product, AppError> {
        let product = self.find(id).await?;
        let validated = validate(form, ImageRule::Optional)?;

        let new_image = match &validated.image {
            Some(image) => {
                let name = self.put_image(image).await?;
                if !product.image.is_empty() {
                    self.files.delete(IMAGE_NAMESPACE, &product.image).await?;
                    debug!(image = %product.image, "Deleted previous image");
                }
                Some(name)
            }
            None => None,
        };

        let updated = self
            .records
            .update(
                &product,
                ProductChanges {
                    image: new_image,
                    title: validated.title,
                    description: validated.description,
                    price: validated.price,
                    stock: validated.stock,
                },
            )
            .await?;

        info!(product_id = updated.id, image = %updated.image, "Updated product");
        Ok(updated)
    }

    /// Remove a product and its image
    ///
    /// The image is deleted before the row; if the row delete then fails the
    /// row survives pointing at a missing file.
    #[instrument(name = "products::delete", skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<Product, AppError> {
        let product = self.find(id).await?;

        self.files.delete(IMAGE_NAMESPACE, &product.image).await?;
        self.records.delete(&product).await?;

        info!(product_id = product.id, "Deleted product");
        Ok(product)
    }

    async fn put_image(&self, image: &ValidImage) -> Result<String, AppError> {
        let name = hash_name(&image.bytes, image.format.extension());
        self.files.put(IMAGE_NAMESPACE, &name, &image.bytes).await?;
        debug!(image = %name, bytes = image.bytes.len(), "Stored image");
        Ok(name)
    }
}
