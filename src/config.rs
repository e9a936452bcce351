//! Configuration types.

use crate::error::ConfigError;

/// Bot configuration, populated from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// App secret used to verify webhook request signatures.
    pub app_secret: String,
    /// Token the platform echoes back during the subscription handshake.
    pub verify_token: String,
    /// Page access token for the Send API.
    pub page_access_token: String,
    /// Public base URL of this server (audio links are built from it).
    pub server_url: String,
    /// Port to listen on.
    pub port: u16,
    /// Path to the local state database.
    pub db_path: String,
    /// Directory of static audio assets served at the server root.
    pub public_dir: String,
}

impl BotConfig {
    /// Read configuration from the environment.
    ///
    /// The four platform values are required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("not a valid port number: {raw}"),
            })?,
            Err(_) => 5000,
        };

        Ok(Self {
            app_secret: require_env("MESSENGER_APP_SECRET")?,
            verify_token: require_env("MESSENGER_VERIFY_TOKEN")?,
            page_access_token: require_env("MESSENGER_PAGE_ACCESS_TOKEN")?,
            server_url: require_env("SERVER_URL")?.trim_end_matches('/').to_string(),
            port,
            db_path: std::env::var("AMBIENT_BOT_DB_PATH")
                .unwrap_or_else(|_| "./data/ambient-bot.db".to_string()),
            public_dir: std::env::var("AMBIENT_BOT_PUBLIC_DIR")
                .unwrap_or_else(|_| "./public".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}
