//! Service configuration

use hateshield_classifiers::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Title reported by the API
pub const API_TITLE: &str = "HateShield AI API";

/// API version
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix for nested environment overrides, e.g. `HATESHIELD__SERVER__PORT`
const ENV_PREFIX: &str = "HATESHIELD";

/// Top-level service settings.
///
/// Resolved in order: built-in defaults, optional YAML file, `HATESHIELD__*`
/// environment variables, then `MONGODB_URI` / `DB_NAME`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

impl Settings {
    /// Load settings, reading `path` if it exists
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Reading configuration from {}", path.display());
        }

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .set_override_option("database.uri", std::env::var("MONGODB_URI").ok())?
            .set_override_option("database.name", std::env::var("DB_NAME").ok())?
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API from a browser
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Return raw inference error text to clients in 500 responses
    #[serde(default = "default_true")]
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            expose_error_details: true,
        }
    }
}

/// Persistence backend settings.
///
/// Nothing is persisted yet; the values are only loaded and logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_uri")]
    pub uri: String,

    #[serde(default = "default_database_name")]
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: default_database_uri(),
            name: default_database_name(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    // Vite dev server
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

fn default_database_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "hate_shield_ai".to_string()
}

fn default_true() -> bool {
    true
}
