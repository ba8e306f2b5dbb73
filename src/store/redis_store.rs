/// Redis-backed token store
///
/// Uses a multiplexed async connection; entry expiry relies on Redis's
/// native per-key TTL, so no sweeping is needed on our side.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

use crate::error::{AppError, CacheError};
use crate::store::TokenStore;

#[derive(Clone)]
pub struct RedisTokenStore {
    connection: MultiplexedConnection,
}

impl RedisTokenStore {
    /// Connect to Redis at `url` (e.g. `redis://localhost:6379/0`).
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = Client::open(url).map_err(|e| {
            tracing::error!("Failed to parse Redis URL: {}", e);
            AppError::Cache(CacheError::Connection(format!("Invalid Redis URL: {}", e)))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to Redis: {}", e);
                AppError::Cache(CacheError::Connection(e.to_string()))
            })?;

        tracing::info!("Connected to Redis");
        Ok(Self { connection })
    }
}

#[async_trait::async_trait]
impl TokenStore for RedisTokenStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), AppError> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(seconds) = ttl {
            cmd.arg("EX").arg(seconds);
        }
        let result = cmd.query_async::<_, ()>(&mut conn).await;
        result.map_err(|e| {
            tracing::error!("Failed to set key '{}': {}", key, e);
            AppError::Cache(CacheError::Command(e.to_string()))
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            tracing::error!("Failed to get key '{}': {}", key, e);
            AppError::Cache(CacheError::Command(e.to_string()))
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.connection.clone();
        conn.exists::<_, bool>(key).await.map_err(|e| {
            tracing::error!("Failed to check key '{}': {}", key, e);
            AppError::Cache(CacheError::Command(e.to_string()))
        })
    }
}
