//! End-to-end tests for the admin gate and session endpoints.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; no
//! socket is bound.

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use compara::api::{self, AuthConfig, AuthState, CookieCheck, SESSION_COOKIE_NAME};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";
const PASSWORD: &str = "correct horse battery staple";

fn state_with(config: AuthConfig) -> Result<Arc<AuthState>> {
    let state = AuthState::new(config, &SecretString::from(SECRET))?;
    Ok(Arc::new(state))
}

fn app(cookie_check: CookieCheck) -> Result<(Router, Arc<AuthState>)> {
    let state = state_with(
        AuthConfig::new()
            .with_admin_password(Some(SecretString::from(PASSWORD)))
            .with_cookie_check(cookie_check),
    )?;
    Ok((api::router(state.clone()), state))
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Result<Response> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }
    Ok(app.clone().oneshot(builder.body(Body::empty())?).await?)
}

async fn post_json(app: &Router, uri: &str, body: &Value, cookie: Option<&str>) -> Result<Response> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = cookie {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }
    Ok(app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string()))?)
        .await?)
}

async fn json_body(response: Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn header<'a>(response: &'a Response, name: axum::http::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|value| value.to_str().ok())
}

/// Token carried by a `Set-Cookie` header for the session cookie.
fn cookie_token(set_cookie: &str) -> Option<String> {
    let first = set_cookie.split(';').next()?;
    let (name, value) = first.split_once('=')?;
    (name == SESSION_COOKIE_NAME).then(|| value.to_string())
}

#[tokio::test]
async fn login_page_is_reachable_without_cookie() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;
    let response = get(&app, "/admin", None).await?;
    // Allowed through the gate; nothing in this service renders the page.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header(&response, LOCATION).is_none());
    Ok(())
}

#[tokio::test]
async fn admin_page_without_cookie_redirects_to_login() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;
    let response = get(&app, "/admin/cards", None).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        header(&response, LOCATION),
        Some("/admin?next=%2Fadmin%2Fcards")
    );
    Ok(())
}

#[tokio::test]
async fn presence_mode_accepts_any_cookie_value() -> Result<()> {
    let (app, _) = app(CookieCheck::Presence)?;
    let response = get(&app, "/admin/cards", Some("not-a-token")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header(&response, LOCATION).is_none());

    let response = get(&app, "/api/admin/upload", Some("expired.or.forged")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn verify_mode_rejects_invalid_cookie_value() -> Result<()> {
    let (app, state) = app(CookieCheck::Verify)?;

    let response = get(&app, "/admin/cards", Some("not-a-token")).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let expired = state.codec().create_token_at(60, 1_000);
    let response = get(&app, "/api/admin/upload", Some(&expired)).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let valid = state.codec().create_token(60);
    let response = get(&app, "/admin/cards", Some(&valid)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn login_api_is_reachable_without_cookie() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;
    let response = post_json(
        &app,
        "/api/admin/login",
        &json!({ "password": "wrong" }),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await?, json!({ "error": "Invalid password" }));
    Ok(())
}

#[tokio::test]
async fn admin_api_without_cookie_is_unauthorized_json() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;
    let response = get(&app, "/api/admin/upload", None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(header(&response, LOCATION).is_none());
    assert_eq!(json_body(response).await?, json!({ "error": "Unauthorized" }));
    Ok(())
}

#[tokio::test]
async fn public_paths_pass_through() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;
    for uri in ["/", "/es/tarjetas", "/administrator"] {
        let response = get(&app, uri, None).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(header(&response, LOCATION).is_none(), "{uri}");
    }

    let response = get(&app, "/health", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn login_session_logout_flow() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;

    let response = post_json(
        &app,
        "/api/admin/login",
        &json!({ "password": PASSWORD }),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = header(&response, SET_COOKIE)
        .context("login should set a cookie")?
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert_eq!(json_body(response).await?, json!({ "ok": true }));

    let token = cookie_token(&set_cookie).context("session cookie value")?;

    let response = get(&app, "/api/admin/session", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["authenticated"], json!(true));
    assert!(body["expires_at"].as_u64().is_some());

    let response = get(&app, "/admin/cards", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(&app, "/api/admin/logout", &json!({}), Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = header(&response, SET_COOKIE).unwrap_or_default().to_string();
    assert_eq!(cookie_token(&cleared), Some(String::new()));
    assert!(cleared.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn logout_clears_stale_cookie_in_both_modes() -> Result<()> {
    for check in [CookieCheck::Verify, CookieCheck::Presence] {
        let (app, state) = app(check)?;
        let expired = state.codec().create_token_at(60, 1_000);

        for cookie in [expired.as_str(), "forged-value"] {
            let response = post_json(&app, "/api/admin/logout", &json!({}), Some(cookie)).await?;
            assert_eq!(response.status(), StatusCode::OK, "{check} {cookie}");
            let cleared = header(&response, SET_COOKIE)
                .context("logout should clear the cookie")?
                .to_string();
            assert_eq!(cookie_token(&cleared), Some(String::new()));
            assert!(cleared.contains("Max-Age=0"));
            assert_eq!(json_body(response).await?, json!({ "ok": true }));
        }
    }
    Ok(())
}

#[tokio::test]
async fn logout_without_cookie_is_unauthorized_in_both_modes() -> Result<()> {
    for check in [CookieCheck::Verify, CookieCheck::Presence] {
        let (app, _) = app(check)?;
        let response = post_json(&app, "/api/admin/logout", &json!({}), None).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{check}");
        assert!(header(&response, SET_COOKIE).is_none());
        assert_eq!(json_body(response).await?, json!({ "error": "Unauthorized" }));
    }
    Ok(())
}

#[tokio::test]
async fn session_endpoint_verifies_even_in_presence_mode() -> Result<()> {
    let (app, _) = app(CookieCheck::Presence)?;
    let response = get(&app, "/api/admin/session", Some("garbage")).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await?, json!({ "error": "Unauthorized" }));
    Ok(())
}

#[tokio::test]
async fn login_without_configured_password_is_server_error() -> Result<()> {
    let state = state_with(AuthConfig::new())?;
    let app = api::router(state);
    let response = post_json(
        &app,
        "/api/admin/login",
        &json!({ "password": PASSWORD }),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(header(&response, SET_COOKIE).is_none());
    assert_eq!(json_body(response).await?, json!({ "error": "Server misconfigured" }));
    Ok(())
}

#[tokio::test]
async fn login_with_malformed_body_is_bad_request() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;
    let response = post_json(&app, "/api/admin/login", &json!({ "pass": 1 }), None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(header(&response, SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn custom_session_ttl_is_used_for_cookie() -> Result<()> {
    let state = state_with(
        AuthConfig::new()
            .with_admin_password(Some(SecretString::from(PASSWORD)))
            .with_session_ttl_seconds(600),
    )?;
    let app = api::router(state.clone());
    let response = post_json(
        &app,
        "/api/admin/login",
        &json!({ "password": PASSWORD }),
        None,
    )
    .await?;
    let set_cookie = header(&response, SET_COOKIE).unwrap_or_default().to_string();
    assert!(set_cookie.contains("Max-Age=600"));

    let token = cookie_token(&set_cookie).context("session cookie value")?;
    let claims = state.codec().claims(Some(&token)).context("token should verify")?;
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    assert!(claims.expires_at > now && claims.expires_at <= now + 600);
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() -> Result<()> {
    let (app, _) = app(CookieCheck::Verify)?;

    let response = get(&app, "/health", None).await?;
    let generated = header(&response, axum::http::HeaderName::from_static("x-request-id"));
    assert!(generated.is_some_and(|id| id.len() == 26));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(
        header(&response, axum::http::HeaderName::from_static("x-request-id")),
        Some("req-123")
    );
    Ok(())
}
