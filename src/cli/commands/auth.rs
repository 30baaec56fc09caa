use crate::api::{CookieCheck, DEFAULT_SESSION_TTL_SECONDS};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_GATE_COOKIE_CHECK: &str = "gate-cookie-check";

#[derive(Debug)]
pub struct Options {
    pub session_secret: SecretString,
    pub admin_password: Option<SecretString>,
    pub session_ttl_seconds: u64,
    pub cookie_check: CookieCheck,
}

impl Options {
    /// Parse admin auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the session secret is missing or empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let session_secret = match matches.get_one::<String>(ARG_SESSION_SECRET) {
            Some(value) if !value.trim().is_empty() => SecretString::from(value.clone()),
            _ => anyhow::bail!("missing required argument: --{ARG_SESSION_SECRET}"),
        };

        let admin_password = matches
            .get_one::<String>(ARG_ADMIN_PASSWORD)
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        let cookie_check = matches
            .get_one::<String>(ARG_GATE_COOKIE_CHECK)
            .map_or(Ok(CookieCheck::default()), |v| v.parse::<CookieCheck>())
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(Self {
            session_secret,
            admin_password,
            session_ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
            cookie_check,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign admin session tokens")
                .env("COMPARA_SESSION_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password accepted by the admin login")
                .long_help(
                    "Password accepted by the admin login. When unset the server still starts, but every login attempt fails with 500.",
                )
                .env("COMPARA_ADMIN_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("COMPARA_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_GATE_COOKIE_CHECK)
                .long(ARG_GATE_COOKIE_CHECK)
                .help("How the gate checks the session cookie: verify or presence")
                .env("COMPARA_GATE_COOKIE_CHECK")
                .default_value("verify")
                .value_parser(["verify", "presence"]),
        )
}
