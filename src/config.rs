// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Which backend holds server-side sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    /// Process-local map, lost on restart. Used when `DEV=true`.
    Memory,
    /// The `sessions` table in the main store.
    Database,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub port: u16,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub oauth_redirect_url: String,
    /// Key for the signed OAuth `state` parameter.
    pub session_secret: String,
    pub session_backend: SessionBackend,
    pub session_ttl_secs: u64,
    pub cookie_secure: bool,
    pub sweep_interval_secs: u64,
    pub allowed_origins: Vec<String>,
}

/// How long a user has to complete the Google consent screen.
pub const OAUTH_STATE_TTL_SECS: u64 = 600;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "quizroom_sid";

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quizroom.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let google_client_id = env::var("GOOGLE_CLIENT_ID")
            .expect("GOOGLE_CLIENT_ID must be set");

        let google_client_secret = env::var("GOOGLE_CLIENT_SECRET")
            .expect("GOOGLE_CLIENT_SECRET must be set");

        let oauth_redirect_url = env::var("OAUTH_REDIRECT_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/auth/google/callback", port));

        let session_secret = env::var("SESSION_SECRET")
            .unwrap_or_else(|_| google_client_secret.clone());

        let session_backend = if env_flag("DEV") {
            SessionBackend::Memory
        } else {
            SessionBackend::Database
        };

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30 * 60);

        let sweep_interval_secs = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(60);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        Self {
            database_url,
            rust_log,
            port,
            google_client_id,
            google_client_secret,
            oauth_redirect_url,
            session_secret,
            session_backend,
            session_ttl_secs,
            cookie_secure: env_flag("COOKIE_SECURE"),
            sweep_interval_secs,
            allowed_origins,
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_empty_entries_dropped() {
        let origins = parse_origins(" http://a.test/ ,,http://b.test");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }
}
