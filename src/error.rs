//! Error types for ambient-bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Outbound Send API errors.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Send API request failed: {0}")]
    Request(String),

    #[error("Send API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Webhook ingress errors.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing X-Hub-Signature header")]
    MissingSignature,

    #[error("Request signature did not match")]
    BadSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
