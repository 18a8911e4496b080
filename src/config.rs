// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "exam_session";

/// Where unauthenticated or wrong-role requests are sent.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,

    /// Lifetime of a server-side session, in seconds.
    pub session_ttl_seconds: i64,

    /// Marks the session cookie `Secure` (HTTPS deployments).
    pub secure_cookies: bool,

    /// Per-IP token bucket on `/login` and `/register`: one token is restored
    /// every `auth_replenish_seconds`, up to `auth_burst` tokens.
    pub auth_replenish_seconds: u64,
    pub auth_burst: u32,

    /// Optional admin account created at startup.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,

    /// Settings that failed to parse and fell back to their default.
    /// Logged by `main` once tracing is up.
    pub env_warnings: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://exam_portal.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let mut env_warnings = Vec::new();

        Self {
            database_url,
            rust_log,
            bind_addr,
            session_ttl_seconds: env_or("SESSION_TTL_SECONDS", 86_400, &mut env_warnings),
            secure_cookies: env_or("SECURE_COOKIES", false, &mut env_warnings),
            auth_replenish_seconds: env_or("AUTH_REPLENISH_SECONDS", 2, &mut env_warnings),
            auth_burst: env_or("AUTH_BURST", 5, &mut env_warnings),
            admin_username: env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
            env_warnings,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T, warnings: &mut Vec<String>) -> T {
    parse_or(key, env::var(key).ok(), default, warnings)
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T, warnings: &mut Vec<String>) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warnings.push(format!("Ignoring unparsable {}={:?}, using default", key, raw));
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_value_falls_back_and_is_reported() {
        let mut warnings = Vec::new();

        let ttl: i64 = parse_or("SESSION_TTL_SECONDS", Some("a day".to_string()), 86_400, &mut warnings);

        assert_eq!(ttl, 86_400);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("SESSION_TTL_SECONDS"));
    }

    #[test]
    fn valid_or_missing_values_are_silent() {
        let mut warnings = Vec::new();

        assert_eq!(parse_or("AUTH_BURST", Some("9".to_string()), 5u32, &mut warnings), 9);
        assert!(parse_or("SECURE_COOKIES", Some("true".to_string()), false, &mut warnings));
        assert_eq!(parse_or("AUTH_BURST", None, 5u32, &mut warnings), 5);
        assert!(warnings.is_empty());
    }
}
