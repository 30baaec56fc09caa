//! API handlers for the admin surface.

pub mod auth;
pub mod health;

use axum::{http::StatusCode, response::Response};

/// Fallback for paths no handler serves (catalog pages, uploads, ...).
///
/// Registered as the router fallback so the gate runs before the 404.
pub async fn not_found() -> Response {
    auth::types::error_response(StatusCode::NOT_FOUND, "Not Found")
}
