//! Admin login, logout and session endpoints.

use axum::{
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Json},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    state::AuthState,
    types::{ErrorResponse, LoginRequest, OkResponse, SessionResponse, error_response},
};

pub const SESSION_COOKIE_NAME: &str = "compara_admin_session";

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Password accepted, session cookie set", body = OkResponse),
        (status = 400, description = "Missing or malformed body", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 500, description = "Admin password is not configured", body = ErrorResponse)
    ),
    tag = "admin"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(expected) = auth_state.config().admin_password() else {
        error!("Admin password is not configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server misconfigured");
    };

    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request");
    };

    if !auth_state
        .codec()
        .secrets_match(&request.password, expected.expose_secret())
    {
        warn!("Admin login failed: wrong password");
        return error_response(StatusCode::UNAUTHORIZED, "Invalid password");
    }

    let token = auth_state
        .codec()
        .create_token(auth_state.config().session_ttl_seconds());

    match session_cookie(&auth_state, &token) {
        Ok(cookie) => {
            info!("Admin session started");
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            (StatusCode::OK, headers, Json(OkResponse { ok: true })).into_response()
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = OkResponse),
        (status = 401, description = "No session", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn logout() -> impl IntoResponse {
    // Always clear the cookie; there is no server-side session to delete.
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear_session_cookie());
    (StatusCode::OK, headers, Json(OkResponse { ok: true }))
}

#[utoipa::path(
    get,
    path = "/api/admin/session",
    responses(
        (status = 200, description = "Session cookie is valid", body = SessionResponse),
        (status = 401, description = "No valid session", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Full verification regardless of how the gate checks cookies.
    let token = extract_session_token(&headers);
    match auth_state.codec().claims(token.as_deref()) {
        Some(claims) => (
            StatusCode::OK,
            Json(SessionResponse {
                authenticated: true,
                expires_at: claims.expires_at,
            }),
        )
            .into_response(),
        None => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

/// Build the `HttpOnly` session cookie carrying `token`.
pub(super) fn session_cookie(
    auth_state: &AuthState,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = auth_state.config().session_ttl_seconds();
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={ttl_seconds}"
    ))
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "compara_admin_session=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0",
    )
}

/// Value of the session cookie, if the request carries a non-empty one.
pub(super) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .filter(|token| !token.is_empty())
}
