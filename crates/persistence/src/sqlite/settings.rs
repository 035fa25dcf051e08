//! Key/value settings, including the persisted engine configuration

use super::connection::Database;
use greenpoints_core::{EngineConfig, Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, warn};

const ENGINE_CONFIG_KEY: &str = "engine_config";

/// Read a raw setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    sqlx::query_scalar::<sqlx::Sqlite, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))
}

/// Insert or replace a raw setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(value)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

impl Database {
    /// Load the stored engine configuration, or defaults if none is saved
    pub async fn load_config(&self) -> Result<EngineConfig> {
        match get_setting(self.pool(), ENGINE_CONFIG_KEY).await? {
            Some(json) => {
                debug!("Loaded engine config from settings");
                EngineConfig::from_json(&json)
            }
            None => {
                warn!("No engine config stored, using defaults");
                Ok(EngineConfig::default())
            }
        }
    }

    /// Validate and persist the engine configuration
    pub async fn save_config(&self, config: &EngineConfig) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string(config)?;
        set_setting(self.pool(), ENGINE_CONFIG_KEY, &json).await
    }
}
