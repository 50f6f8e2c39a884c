use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::client::PersistClient;
use crate::error::{PersistError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    #[serde(alias = "mongo")]
    MongoDb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::MongoDb => f.write_str("mongodb"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            other => Err(PersistError::InvalidInput(format!(
                "unknown storage backend: {}",
                other
            ))),
        }
    }
}

pub struct PersistClientBuilder {
    backend: StorageBackend,
    mongodb_uri: Option<String>,
    database: Option<String>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            backend: StorageBackend::Memory,
            mongodb_uri: None,
            database: None,
        }
    }

    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    pub async fn build(self) -> Result<PersistClient> {
        match self.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(PersistClient::in_memory())
            }
            StorageBackend::MongoDb => self.build_mongo().await,
        }
    }

    #[cfg(feature = "mongodb")]
    async fn build_mongo(self) -> Result<PersistClient> {
        use std::sync::Arc;

        let mongodb_uri = self
            .mongodb_uri
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        let store = Arc::new(crate::dbs::mongo::MongoStore::connect(&mongodb_uri, &database).await?);
        Ok(PersistClient::new(store.clone(), store))
    }

    #[cfg(not(feature = "mongodb"))]
    async fn build_mongo(self) -> Result<PersistClient> {
        Err(PersistError::Internal(
            "mongodb backend requested but the `mongodb` feature is disabled".to_string(),
        ))
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
