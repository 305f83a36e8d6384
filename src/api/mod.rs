//! API module
//!
//! Contains the HTTP routes, request handlers and response rendering for the
//! product catalog.

pub mod multipart;
pub mod pages;
pub mod products;
pub mod render;

use crate::config::Config;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use std::time::Instant;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Tag every catalog request with an id and log its outcome
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let span = info_span!("catalog_request", %request_id, %method, %path);
    let response = next.run(request).instrument(span).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            %request_id,
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms,
            "Catalog request failed"
        );
    } else {
        info!(
            %request_id,
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms,
            "Catalog request served"
        );
    }

    response
}

/// Build the application router
///
/// # Arguments
/// * `state` - Shared handler state
/// * `config` - Supplies the public storage root and the request body limit
pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(pages::welcome))
        .route("/api/health", get(pages::health_check))
        // Product catalog
        .route("/products", get(products::index).post(products::store))
        .route("/products/create", get(products::create))
        .route(
            "/products/:id",
            get(products::show)
                .put(products::update)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route("/products/:id/edit", get(products::edit))
        // Served by the users controller elsewhere
        .route("/dashboard", get(pages::dashboard))
        .route("/users", get(pages::users))
        // Public storage disk (product images)
        .nest_service("/storage", ServeDir::new(&config.storage.root))
        // Middleware (order matters - request_id should be first)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for development
        .with_state(state)
}
