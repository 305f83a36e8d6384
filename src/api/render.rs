//! Presentation rendering
//!
//! Views are rendered as JSON documents naming the view and its bindings.
//! Redirects become `303 See Other` and carry their flash message in a
//! short-lived cookie that the next listing request consumes.

use crate::catalog::{Flash, Presentation};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Name of the cookie carrying the pending flash message
pub const FLASH_COOKIE: &str = "flash";

impl IntoResponse for Presentation {
    fn into_response(self) -> Response {
        match self {
            Presentation::View { name, data } => {
                (StatusCode::OK, Json(json!({ "view": name, "data": data }))).into_response()
            }
            Presentation::Redirect { to, flash } => {
                let cookie = format!(
                    "{}={}; Path=/; HttpOnly; SameSite=Lax",
                    FLASH_COOKIE,
                    flash.key()
                );
                (
                    StatusCode::SEE_OTHER,
                    [(header::LOCATION, to), (header::SET_COOKIE, cookie)],
                )
                    .into_response()
            }
        }
    }
}

/// Pending flash message from the request's cookies, if any
pub fn read_flash(headers: &HeaderMap) -> Option<Flash> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .and_then(|(_, value)| Flash::from_key(value))
}

/// `Set-Cookie` value that expires the flash cookie
pub fn clear_flash_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0", FLASH_COOKIE)
}
