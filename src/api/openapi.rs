use super::handlers::{auth, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::session::login,
        auth::session::logout,
        auth::session::session,
    ),
    components(schemas(
        health::Health,
        auth::types::LoginRequest,
        auth::types::OkResponse,
        auth::types::SessionResponse,
        auth::types::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Liveness and build information"),
        (name = "admin", description = "Admin login and session cookie"),
    )
)]
struct ApiDoc;

/// The `OpenAPI` document, titled and versioned from Cargo metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_admin_routes() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));
        for path in [
            "/health",
            "/api/admin/login",
            "/api/admin/logout",
            "/api/admin/session",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
