use crate::{
    api::{self, AuthConfig, AuthState, CookieCheck},
    cli::telemetry,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub session_secret: SecretString,
    pub admin_password: Option<SecretString>,
    pub session_ttl_seconds: u64,
    pub cookie_check: CookieCheck,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the session secret is unusable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if args.admin_password.is_none() {
        warn!("No admin password configured; admin login will answer 500");
    }

    let config = AuthConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_admin_password(args.admin_password)
        .with_cookie_check(args.cookie_check);

    let auth_state =
        AuthState::new(config, &args.session_secret).context("Invalid session secret")?;

    let result = api::new(args.port, Arc::new(auth_state)).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("session_secret_set", "true".to_string()),
        (
            "admin_password_set",
            args.admin_password.is_some().to_string(),
        ),
        ("session_ttl_seconds", args.session_ttl_seconds.to_string()),
        ("gate_cookie_check", args.cookie_check.to_string()),
    ];

    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let lines = entries
        .iter()
        .map(|(key, value)| format!("  {key:<width$} = {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    info!("Startup configuration:\n{lines}");
}
