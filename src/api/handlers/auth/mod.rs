//! Admin authentication: stateless session tokens, the login/logout
//! endpoints, and the request gate protecting `/admin` and `/api/admin`.
//!
//! ## Session Secret
//!
//! Tokens are signed with HMAC-SHA256 keyed by the session secret. All
//! instances serving the same site must share the secret; rotating it
//! invalidates every issued session.
//!
//! ## Cookie Check
//!
//! The gate can accept any non-empty session cookie (`presence`) or require a
//! valid token (`verify`, the default). `GET /api/admin/session` always
//! verifies.

pub mod gate;
pub mod session;
mod state;
pub mod token;
pub(crate) mod types;

pub use gate::{CookieCheck, GateDecision, GatePaths};
pub use state::{AuthConfig, AuthState};
pub use token::{DEFAULT_SESSION_TTL_SECONDS, SessionClaims, TokenCodec, TokenError};
