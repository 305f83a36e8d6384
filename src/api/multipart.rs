//! Multipart form reading
//!
//! Collects the product form fields from a `multipart/form-data` body.
//! Nothing is checked here beyond being able to read the body; the rules live
//! in `catalog::validation`.

use crate::catalog::{ProductForm, UploadedFile};
use crate::error::AppError;
use axum::extract::Multipart;
use tracing::{debug, error, warn};

/// Read a product form out of a multipart body
///
/// An `image` part with no filename and no bytes (a form submitted without
/// choosing a file) is treated as absent.
pub async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        AppError::InvalidRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .filter(|s| !s.is_empty());
                let content_type = field.content_type().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    error!("Failed to read image data: {}", e);
                    AppError::InvalidRequest(format!("Failed to read image data: {}", e))
                })?;

                if file_name.is_none() && bytes.is_empty() {
                    debug!("Empty image part, treating as no file");
                    continue;
                }
                form.image = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "title" | "description" | "price" | "stock" => {
                let text = field.text().await.map_err(|e| {
                    error!("Failed to read {} field: {}", field_name, e);
                    AppError::InvalidRequest(format!("Failed to read {} field: {}", field_name, e))
                })?;
                let slot = match field_name.as_str() {
                    "title" => &mut form.title,
                    "description" => &mut form.description,
                    "price" => &mut form.price,
                    _ => &mut form.stock,
                };
                *slot = Some(text);
            }
            // Method override and CSRF token sent by HTML forms
            "_method" | "_token" => {}
            _ => {
                warn!("Unknown multipart field: {}", field_name);
            }
        }
    }

    Ok(form)
}
