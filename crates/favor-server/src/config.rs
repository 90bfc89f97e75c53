use anyhow::{Context, Result, bail};

/// Placeholder secrets that must never sign real tokens.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub token_ttl_hours: i64,
}

impl Config {
    /// Read configuration from `FAVOR_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("FAVOR_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("FAVOR_JWT_SECRET is unset or still a placeholder");
        }

        let db_path = std::env::var("FAVOR_DB_PATH").unwrap_or_else(|_| "favor.db".into());
        let host = std::env::var("FAVOR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("FAVOR_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .context("FAVOR_PORT must be a port number")?;
        let token_ttl_hours: i64 = match std::env::var("FAVOR_TOKEN_TTL_HOURS") {
            Ok(v) => v.parse().context("FAVOR_TOKEN_TTL_HOURS must be an integer")?,
            Err(_) => favor_api::token::DEFAULT_TTL_HOURS,
        };
        if token_ttl_hours <= 0 {
            bail!("FAVOR_TOKEN_TTL_HOURS must be positive");
        }

        Ok(Self {
            jwt_secret,
            db_path,
            host,
            port,
            token_ttl_hours,
        })
    }
}
