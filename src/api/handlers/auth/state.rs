//! Auth state and configuration.

use secrecy::{ExposeSecret, SecretString};

use super::{
    gate::{CookieCheck, GatePaths},
    token::{DEFAULT_SESSION_TTL_SECONDS, TokenCodec, TokenError},
};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: u64,
    admin_password: Option<SecretString>,
    cookie_check: CookieCheck,
    gate_paths: GatePaths,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            admin_password: None,
            cookie_check: CookieCheck::default(),
            gate_paths: GatePaths::default(),
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    /// An empty password counts as "not configured".
    #[must_use]
    pub fn with_admin_password(mut self, password: Option<SecretString>) -> Self {
        self.admin_password = password.filter(|secret| !secret.expose_secret().is_empty());
        self
    }

    #[must_use]
    pub fn with_cookie_check(mut self, cookie_check: CookieCheck) -> Self {
        self.cookie_check = cookie_check;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn cookie_check(&self) -> CookieCheck {
        self.cookie_check
    }

    #[must_use]
    pub fn gate_paths(&self) -> &GatePaths {
        &self.gate_paths
    }

    pub(super) fn admin_password(&self) -> Option<&SecretString> {
        self.admin_password.as_ref()
    }
}

/// Shared, immutable auth state injected into handlers and the gate.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    codec: TokenCodec,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the session secret is empty.
    pub fn new(config: AuthConfig, session_secret: &SecretString) -> Result<Self, TokenError> {
        Ok(Self {
            config,
            codec: TokenCodec::new(session_secret)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
