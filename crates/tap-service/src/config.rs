//! Tap service configuration.
//!
//! Configuration is loaded from environment variables. The bot token is held
//! as a `SecretString` and the database URL is redacted in Debug output.

use axum::http::HeaderValue;
use common::init_data::{DEFAULT_CLOCK_SKEW, DEFAULT_MAX_AGE, MAX_CLOCK_SKEW, MAX_REPLAY_WINDOW};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Tap service configuration.
#[derive(Clone)]
pub struct Config {
    /// SQLite connection URL (e.g. `sqlite://data/tap.db?mode=rwc`).
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Bot token: the shared secret for initData and the Bot API credential.
    pub bot_token: SecretString,

    /// Telegram Bot API base URL (overridable for tests).
    pub telegram_api_url: String,

    /// Maximum age of `auth_date` accepted by the initData gate.
    pub init_data_max_age_seconds: u64,

    /// Tolerance for `auth_date` ahead of the server clock.
    pub init_data_clock_skew_seconds: u64,

    /// Origins allowed by CORS. Empty disables cross-origin access.
    pub cors_allowed_origins: Vec<String>,

    /// Database file served by `/download_db`. `None` leaves the route unmounted.
    pub db_download_path: Option<PathBuf>,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("bot_token", &self.bot_token)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("init_data_max_age_seconds", &self.init_data_max_age_seconds)
            .field(
                "init_data_clock_skew_seconds",
                &self.init_data_clock_skew_seconds,
            )
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("db_download_path", &self.db_download_path)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid initData policy configuration: {0}")]
    InvalidInitDataPolicy(String),

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bot_token = vars
            .get("TELEGRAM_BOT_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::from(v.trim().to_string()))
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let telegram_api_url = vars
            .get("TELEGRAM_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());

        // Parse replay window with validation
        let init_data_max_age_seconds =
            if let Some(value_str) = vars.get("INIT_DATA_MAX_AGE_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidInitDataPolicy(format!(
                        "INIT_DATA_MAX_AGE_SECONDS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidInitDataPolicy(
                        "INIT_DATA_MAX_AGE_SECONDS must be greater than 0".to_string(),
                    ));
                }

                if value > MAX_REPLAY_WINDOW.as_secs() {
                    return Err(ConfigError::InvalidInitDataPolicy(format!(
                        "INIT_DATA_MAX_AGE_SECONDS must not exceed {} seconds, got {}",
                        MAX_REPLAY_WINDOW.as_secs(),
                        value
                    )));
                }

                value
            } else {
                DEFAULT_MAX_AGE.as_secs()
            };

        // Parse future clock skew tolerance with validation
        let init_data_clock_skew_seconds =
            if let Some(value_str) = vars.get("INIT_DATA_CLOCK_SKEW_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidInitDataPolicy(format!(
                        "INIT_DATA_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value > MAX_CLOCK_SKEW.as_secs() {
                    return Err(ConfigError::InvalidInitDataPolicy(format!(
                        "INIT_DATA_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                        MAX_CLOCK_SKEW.as_secs(),
                        value
                    )));
                }

                value
            } else {
                DEFAULT_CLOCK_SKEW.as_secs()
            };

        let cors_allowed_origins = match vars.get("CORS_ALLOWED_ORIGINS") {
            Some(list) => parse_origins(list)?,
            None => Vec::new(),
        };

        let db_download_path = vars
            .get("DB_DOWNLOAD_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Config {
            database_url,
            bind_address,
            bot_token,
            telegram_api_url,
            init_data_max_age_seconds,
            init_data_clock_skew_seconds,
            cors_allowed_origins,
            db_download_path,
        })
    }
}

fn parse_origins(list: &str) -> Result<Vec<String>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            // Browsers send the Origin header without a trailing slash
            let origin = origin.trim_end_matches('/');
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
        })
        .collect()
}
