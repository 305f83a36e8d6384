//! Product API handlers
//!
//! Contains HTTP request handlers for product CRUD operations.

use super::multipart::read_product_form;
use super::render::{clear_flash_cookie, read_flash};
use crate::catalog::{Flash, Presentation, ProductId};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

/// Query string of the listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Requested page; anything that is not a positive integer means page 1
    pub page: Option<String>,
}

/// Parse a path id; ids that cannot exist are reported as not found
fn parse_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse()
        .map_err(|_| AppError::ProductNotFound(raw.to_string()))
}

/// GET /products - Paginated product listing
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let page = query.page.and_then(|p| p.trim().parse().ok());
    let products = state.products.list(page).await?;

    let flash = read_flash(&headers);
    let view = Presentation::product_index(products, flash);
    Ok(match flash {
        Some(_) => ([(header::SET_COOKIE, clear_flash_cookie())], view).into_response(),
        None => view.into_response(),
    })
}

/// GET /products/create - Creation form
pub async fn create() -> Presentation {
    Presentation::create_form()
}

/// POST /products - Create a product from a multipart form
pub async fn store(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Presentation, AppError> {
    let form = read_product_form(multipart).await?;
    let product = state.products.store(form).await?;
    info!(product_id = product.id, "Product stored");
    Ok(Presentation::to_index(Flash::Stored))
}

/// GET /products/:id - Show a product
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Presentation, AppError> {
    let product = state.products.find(parse_id(&id)?).await?;
    Ok(Presentation::product_show(product))
}

/// GET /products/:id/edit - Edit form for a product
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Presentation, AppError> {
    let product = state.products.find(parse_id(&id)?).await?;
    Ok(Presentation::edit_form(product))
}

/// PUT/PATCH /products/:id - Update a product from a multipart form
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Presentation, AppError> {
    let id = parse_id(&id)?;
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            // An unknown id is reported ahead of an unreadable body
            state.products.find(id).await?;
            warn!(product_id = id, "Update body is not multipart: {}", rejection);
            return Err(AppError::InvalidRequest(rejection.body_text()));
        }
    };
    let form = read_product_form(multipart).await?;
    let product = state.products.update(id, form).await?;
    info!(product_id = product.id, "Product updated");
    Ok(Presentation::to_index(Flash::Updated))
}

/// DELETE /products/:id - Delete a product and its image
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Presentation, AppError> {
    let product = state.products.delete(parse_id(&id)?).await?;
    info!(product_id = product.id, "Product deleted");
    Ok(Presentation::to_index(Flash::Deleted))
}
