//! Error types for the weather bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Durable profile storage errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupt row for identity {identity}: {reason}")]
    CorruptRow { identity: i64, reason: String },
}

/// Telegram transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message to chat {chat_id}: {reason}")]
    SendFailed { chat_id: String, reason: String },

    #[error("Channel health check failed: {0}")]
    HealthCheckFailed(String),
}

/// Weather lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API request failed: {0}")]
    Request(String),

    #[error("Weather API returned an error: {0}")]
    Api(String),

    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
