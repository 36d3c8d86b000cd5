use std::env;

use anyhow::{bail, Context, Result};
use tracing::warn;

/// Minimum length for the token signing secret. Anything shorter makes
/// HMAC-SHA256 session tokens brute-forceable offline.
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_api_key: String,
    pub bind_addr: String,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// A missing or weak signing secret is a startup error: every request
    /// depends on token verification, so the failure must surface here
    /// rather than on the first authenticated call.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("CAREBRIDGE_JWT_SECRET")
            .context("CAREBRIDGE_JWT_SECRET is not set")?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            bail!(
                "CAREBRIDGE_JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            );
        }

        let config = Self {
            jwt_secret,
            database_url: env::var("CAREBRIDGE_DATABASE_URL").unwrap_or_else(|_| String::new()),
            database_api_key: env::var("CAREBRIDGE_DATABASE_API_KEY")
                .unwrap_or_else(|_| String::new()),
            bind_addr: env::var("CAREBRIDGE_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        };

        if !config.has_database() {
            warn!("CAREBRIDGE_DATABASE_URL not set - falling back to the in-process store");
        }

        Ok(config)
    }

    pub fn has_database(&self) -> bool {
        !self.database_url.is_empty() && !self.database_api_key.is_empty()
    }
}
