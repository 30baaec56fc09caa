//! Stateless admin session tokens.
//!
//! Flow Overview:
//! 1) Encode `{"exp": <unix-seconds>}` as base64url (no padding); this is the payload.
//! 2) Sign the payload *string* with HMAC-SHA256 keyed by the session secret.
//! 3) Return `payload.signature`.
//!
//! Verification recomputes the HMAC, then decodes the payload and checks `exp`.
//! Every failure collapses to "invalid" for callers; the reason is only logged.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

const SEPARATOR: char = '.';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("session secret is not configured")]
    MissingSecret,
    #[error("invalid session secret")]
    InvalidSecret,
}

/// Why a presented token was refused. Never exposed outside this module.
#[derive(Debug, Error, PartialEq, Eq)]
enum Rejection {
    #[error("empty token")]
    Empty,
    #[error("token must have exactly two segments")]
    Format,
    #[error("invalid signature encoding")]
    SignatureEncoding,
    #[error("signature mismatch")]
    Signature,
    #[error("invalid payload encoding")]
    PayloadEncoding,
    #[error("payload has no numeric exp")]
    Payload,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Deserialize)]
struct PresentedClaims {
    // JSON numbers of any shape are accepted, strings are not.
    exp: f64,
}

/// Claims of a token that passed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub expires_at: u64,
}

#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec keyed by the session secret.
    ///
    /// # Errors
    /// Returns [`TokenError::MissingSecret`] when the secret is empty or blank.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let secret = secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| TokenError::InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Mint a token that expires `ttl_seconds` from now.
    #[must_use]
    pub fn create_token(&self, ttl_seconds: u64) -> String {
        self.create_token_at(ttl_seconds, unix_now())
    }

    #[must_use]
    pub fn create_token_at(&self, ttl_seconds: u64, now: u64) -> String {
        let exp = now.saturating_add(ttl_seconds);
        let payload = Base64UrlUnpadded::encode_string(format!("{{\"exp\":{exp}}}").as_bytes());
        let signature = Base64UrlUnpadded::encode_string(&self.sign(&payload));
        format!("{payload}{SEPARATOR}{signature}")
    }

    /// True only for a well-formed, correctly signed, unexpired token.
    #[must_use]
    pub fn verify_token(&self, token: Option<&str>) -> bool {
        self.verify_token_at(token, unix_now())
    }

    #[must_use]
    pub fn verify_token_at(&self, token: Option<&str>, now: u64) -> bool {
        self.claims_at(token, now).is_some()
    }

    /// Verified claims of `token`, or `None` when it is invalid for any reason.
    #[must_use]
    pub fn claims(&self, token: Option<&str>) -> Option<SessionClaims> {
        self.claims_at(token, unix_now())
    }

    #[must_use]
    pub fn claims_at(&self, token: Option<&str>, now: u64) -> Option<SessionClaims> {
        match self.check(token.unwrap_or_default(), now) {
            Ok(claims) => Some(claims),
            Err(reason) => {
                debug!("Rejected session token: {reason}");
                None
            }
        }
    }

    fn check(&self, token: &str, now: u64) -> Result<SessionClaims, Rejection> {
        if token.is_empty() {
            return Err(Rejection::Empty);
        }

        let mut segments = token.split(SEPARATOR);
        let (Some(payload), Some(signature), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(Rejection::Format);
        };

        let signature =
            Base64UrlUnpadded::decode_vec(signature).map_err(|_| Rejection::SignatureEncoding)?;
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Rejection::Signature)?;

        let decoded =
            Base64UrlUnpadded::decode_vec(payload).map_err(|_| Rejection::PayloadEncoding)?;
        let claims: PresentedClaims =
            serde_json::from_slice(&decoded).map_err(|_| Rejection::Payload)?;

        #[allow(clippy::cast_precision_loss)]
        let now = now as f64;
        if claims.exp <= now {
            return Err(Rejection::Expired);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expires_at = claims.exp as u64;
        Ok(SessionClaims { expires_at })
    }

    /// Constant-time equality of two secrets, compared as keyed digests.
    #[must_use]
    pub fn secrets_match(&self, candidate: &str, expected: &str) -> bool {
        let mut mac = self.mac.clone();
        mac.update(candidate.as_bytes());
        mac.verify_slice(&self.sign(expected)).is_ok()
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
