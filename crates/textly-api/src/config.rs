use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use textly_persist::StorageBackend;

use crate::models::ModelEntry;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub mongodb: MongoDbConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    /// Catalog served by `GET /ai/models`
    #[serde(default)]
    pub models: Vec<ModelEntry>,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Any OpenAI-compatible endpoint
    pub base_url: String,
    /// Used when a request names no model
    pub default_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default = "default_idle_timeout")]
    pub stream_idle_timeout_secs: u64,
}

impl LlmConfig {
    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the user id verified by the upstream gateway
    pub user_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: "x-user-id".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_request_timeout() -> u64 {
    300
}

fn default_idle_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. {CONFIG_DIR}/default.toml (CONFIG_DIR defaults to `config`)
    /// 2. {CONFIG_DIR}/{ENV}.toml (ENV defaults to `dev`)
    /// 3. `TEXTLY_<SECTION>__<KEY>` environment variables, e.g. `TEXTLY_SERVER__PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false))
            .add_source(
                Environment::with_prefix("TEXTLY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.apply_secrets()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Secrets never live in TOML
    fn apply_secrets(&mut self) -> Result<(), ConfigError> {
        self.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;

        if self.storage.backend == StorageBackend::MongoDb {
            self.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
                ConfigError::Message(
                    "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
                )
            })?;
        }

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.llm.base_url = base_url;
            }
        }
        if let Ok(model) = std::env::var("OPENAI_BASE_MODEL") {
            if !model.trim().is_empty() {
                self.llm.default_model = model;
            }
        }
        Ok(())
    }
}
