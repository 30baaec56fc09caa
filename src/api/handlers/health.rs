use crate::GIT_COMMIT_HASH;
use axum::{
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Debug)]
pub struct Health {
    commit: &'static str,
    name: &'static str,
    version: &'static str,
}

const HEALTH: Health = Health {
    commit: GIT_COMMIT_HASH,
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
};

/// `name:version:shorthash`, the hash left empty when the commit is unknown.
fn x_app(health: &Health) -> String {
    let short_hash = health.commit.get(..7).filter(|_| health.commit.len() > 7);
    format!(
        "{}:{}:{}",
        health.name,
        health.version,
        short_hash.unwrap_or_default()
    )
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = Health),
    ),
    tag = "health"
)]
pub async fn health(method: Method) -> Response {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&x_app(&HEALTH)) {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Invalid X-App header: {err}"),
    }

    if method == Method::GET {
        (StatusCode::OK, headers, Json(HEALTH)).into_response()
    } else {
        (StatusCode::OK, headers).into_response()
    }
}
