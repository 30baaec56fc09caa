//! # Compara (admin session gate)
//!
//! `compara` hosts the admin authentication core of the card price-comparison
//! site: a stateless signed session token, the login/logout endpoints that
//! mint and clear it, and the request gate that protects the admin pages and
//! the admin API.
//!
//! ## Session tokens
//!
//! A token is `payload.signature`, where the payload is the base64url JSON
//! `{"exp": <unix-seconds>}` and the signature is base64url
//! `HMAC-SHA256(secret, payload)`. There is no server-side session table, so
//! expiry is the only way a token stops being valid.
//!
//! ## Gate
//!
//! Every request passes through the gate. Admin page requests without a
//! session are redirected to `/admin?next=<path>`; admin API requests without
//! a session receive `401 {"error":"Unauthorized"}`. The login page and the
//! login API are always reachable.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
