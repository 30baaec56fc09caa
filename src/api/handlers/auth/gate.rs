//! Request gate for the admin surfaces.
//!
//! Flow Overview: classify the request path, and only for protected paths look
//! at the session cookie. Admin pages without a session redirect to the login
//! page with `?next=<path>`; admin API calls without a session get a 401 JSON
//! body. The login page and the login API are never gated. Logout only needs
//! a session cookie to be present, so a stale cookie can still be cleared.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::{fmt, str::FromStr, sync::Arc};
use tracing::debug;
use url::form_urlencoded;

use super::{session::extract_session_token, state::AuthState, types::error_response};

pub const ADMIN_PAGE_PREFIX: &str = "/admin";
pub const ADMIN_API_PREFIX: &str = "/api/admin";
pub const LOGIN_PAGE: &str = "/admin";
pub const LOGIN_API: &str = "/api/admin/login";
pub const LOGOUT_API: &str = "/api/admin/logout";

/// How the gate decides that a request carries a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CookieCheck {
    /// Any non-empty session cookie is accepted without looking at it.
    Presence,
    /// The cookie must hold a correctly signed, unexpired token.
    #[default]
    Verify,
}

impl FromStr for CookieCheck {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "presence" => Ok(Self::Presence),
            "verify" => Ok(Self::Verify),
            other => Err(format!("invalid cookie check: {other}")),
        }
    }
}

impl fmt::Display for CookieCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence => f.write_str("presence"),
            Self::Verify => f.write_str("verify"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatePaths {
    pub admin_page_prefix: String,
    pub admin_api_prefix: String,
    pub login_page: String,
    pub login_api: String,
    pub logout_api: String,
}

impl Default for GatePaths {
    fn default() -> Self {
        Self {
            admin_page_prefix: ADMIN_PAGE_PREFIX.to_string(),
            admin_api_prefix: ADMIN_API_PREFIX.to_string(),
            login_page: LOGIN_PAGE.to_string(),
            login_api: LOGIN_API.to_string(),
            logout_api: LOGOUT_API.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    Public,
    Login,
    Logout,
    AdminPage,
    AdminApi,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
    Reject,
}

impl IntoResponse for GateDecision {
    fn into_response(self) -> Response {
        match self {
            Self::Allow => StatusCode::OK.into_response(),
            Self::Redirect(location) => Redirect::temporary(&location).into_response(),
            Self::Reject => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        }
    }
}

/// `path` is `prefix` itself or lies below it; `/adminx` is not under `/admin`.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn classify(paths: &GatePaths, path: &str) -> PathKind {
    if path == paths.login_page || path == paths.login_api {
        PathKind::Login
    } else if path == paths.logout_api {
        PathKind::Logout
    } else if under(path, &paths.admin_api_prefix) {
        PathKind::AdminApi
    } else if under(path, &paths.admin_page_prefix) {
        PathKind::AdminPage
    } else {
        PathKind::Public
    }
}

/// Login page URL that returns the user to `path` after signing in.
#[must_use]
pub fn login_redirect(paths: &GatePaths, path: &str) -> String {
    let next: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("{}?next={next}", paths.login_page)
}

/// Decide what happens to a request for `path`.
///
/// `has_session` is only consulted for protected paths and receives their kind.
pub fn decide(
    paths: &GatePaths,
    path: &str,
    has_session: impl FnOnce(PathKind) -> bool,
) -> GateDecision {
    match classify(paths, path) {
        PathKind::Public | PathKind::Login => GateDecision::Allow,
        kind => {
            if has_session(kind) {
                GateDecision::Allow
            } else if kind == PathKind::AdminPage {
                GateDecision::Redirect(login_redirect(paths, path))
            } else {
                GateDecision::Reject
            }
        }
    }
}

fn has_session(auth_state: &AuthState, headers: &HeaderMap, kind: PathKind) -> bool {
    let token = extract_session_token(headers);
    if kind == PathKind::Logout {
        return token.is_some();
    }
    match auth_state.config().cookie_check() {
        CookieCheck::Presence => token.is_some(),
        CookieCheck::Verify => auth_state.codec().verify_token(token.as_deref()),
    }
}

/// Axum middleware applying [`decide`] to every request.
pub async fn require_admin(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let decision = decide(
        auth_state.config().gate_paths(),
        request.uri().path(),
        |kind| has_session(&auth_state, request.headers(), kind),
    );

    match decision {
        GateDecision::Allow => next.run(request).await,
        denied => {
            debug!(path = request.uri().path(), ?denied, "Gate denied request");
            denied.into_response()
        }
    }
}
