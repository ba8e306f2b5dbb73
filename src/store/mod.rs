/// Key-value store adapter
///
/// The service only uses the store as a token revocation list: write a key
/// with a time-to-live, check key presence. The trait keeps the revocation
/// manager testable without a running Redis; handles are passed explicitly
/// rather than held as process-wide singletons.

mod memory;
mod redis_store;

pub use memory::InMemoryTokenStore;
pub use redis_store::RedisTokenStore;

use async_trait::async_trait;

use crate::error::AppError;

/// Minimal async key-value interface with optional per-key TTL.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Set `key` to `value`, expiring after `ttl` seconds when given.
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), AppError>;

    /// Fetch the value stored at `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Check whether `key` is present and not expired.
    async fn exists(&self, key: &str) -> Result<bool, AppError>;
}
