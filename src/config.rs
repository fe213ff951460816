//! Configuration, read from the environment at startup.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::profile::UserId;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token.
    pub telegram_token: SecretString,
    /// weatherapi.com API key.
    pub weather_api_key: SecretString,
    /// The single administrator identity (numeric Telegram user id).
    pub admin_id: UserId,
    /// Path to the local profile database.
    pub db_path: PathBuf,
    /// Location passed to the weather API.
    pub location: String,
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// Required: `WEATHERBOT_TELEGRAM_TOKEN`, `WEATHERBOT_WEATHER_API_KEY`,
    /// `WEATHERBOT_ADMIN_ID`. Optional: `WEATHERBOT_DB_PATH` (default
    /// `./data/weatherbot.db`), `WEATHERBOT_LOCATION` (default `Moscow`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_token = require_env("WEATHERBOT_TELEGRAM_TOKEN")?;
        let weather_api_key = require_env("WEATHERBOT_WEATHER_API_KEY")?;

        let admin_raw = require_env("WEATHERBOT_ADMIN_ID")?;
        let admin_id: i64 = admin_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "WEATHERBOT_ADMIN_ID".into(),
                message: format!("expected a numeric Telegram user id, got {admin_raw:?}"),
            })?;

        let db_path = std::env::var("WEATHERBOT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/weatherbot.db"));

        let location =
            std::env::var("WEATHERBOT_LOCATION").unwrap_or_else(|_| "Moscow".to_string());

        Ok(Self {
            telegram_token: SecretString::from(telegram_token),
            weather_api_key: SecretString::from(weather_api_key),
            admin_id: UserId(admin_id),
            db_path,
            location,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}
