use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// Largest accepted request body in bytes (default: `262144`). A saved
    /// dashboard layout is the biggest payload the API takes.
    pub max_body_bytes: usize,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on the graceful shutdown drain, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Public URL of the web app; account emails link back to it.
    pub app_url: String,
    /// Lifetime of an email verification link in hours (default: `24`).
    pub verification_token_expiry_hours: i64,
    /// Lifetime of a password reset link in minutes (default: `60`).
    pub reset_token_expiry_mins: i64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                 |
    /// |-----------------------------------|-------------------------|
    /// | `HOST`                            | `0.0.0.0`               |
    /// | `PORT`                            | `3000`                  |
    /// | `CORS_ORIGINS`                    | `http://localhost:3001` |
    /// | `MAX_BODY_BYTES`                  | `262144`                |
    /// | `REQUEST_TIMEOUT_SECS`            | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`           | `30`                    |
    /// | `APP_URL`                         | `http://localhost:3001` |
    /// | `VERIFICATION_TOKEN_EXPIRY_HOURS` | `24`                    |
    /// | `RESET_TOKEN_EXPIRY_MINS`         | `60`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|o| {
                o.parse()
                    .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
            })
            .collect();

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "262144".into())
            .parse()
            .expect("MAX_BODY_BYTES must be a valid usize");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .trim_end_matches('/')
            .to_string();

        let verification_token_expiry_hours: i64 = std::env::var("VERIFICATION_TOKEN_EXPIRY_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("VERIFICATION_TOKEN_EXPIRY_HOURS must be a valid i64");

        let reset_token_expiry_mins: i64 = std::env::var("RESET_TOKEN_EXPIRY_MINS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("RESET_TOKEN_EXPIRY_MINS must be a valid i64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            max_body_bytes,
            request_timeout_secs,
            shutdown_timeout_secs,
            app_url,
            verification_token_expiry_hours,
            reset_token_expiry_mins,
            jwt,
        }
    }
}
