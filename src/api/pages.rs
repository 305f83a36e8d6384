//! Static and placeholder pages
//!
//! The welcome page, the health check, and the dashboard/users routes whose
//! controller lives outside this service.

use crate::catalog::Presentation;
use crate::error::AppError;
use axum::Json;
use serde::Serialize;

/// Health check payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` when the process can answer
    pub status: String,
    /// Crate version
    pub version: String,
    /// Human-readable message
    pub message: String,
}

/// GET / - Welcome page
pub async fn welcome() -> Presentation {
    Presentation::welcome()
}

/// GET /api/health - Health check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Product catalog is healthy".to_string(),
    })
}

/// GET /dashboard - Served by the users controller, not this service
pub async fn dashboard() -> AppError {
    AppError::NotImplemented("dashboard is served by the users controller".to_string())
}

/// GET /users - Served by the users controller, not this service
pub async fn users() -> AppError {
    AppError::NotImplemented("users is served by the users controller".to_string())
}
