/// In-memory token store
///
/// Drop-in replacement for the Redis store in tests and local development.
/// Expiry is enforced at read time by comparing against the stored deadline;
/// there is no background sweep task. Expired entries are purged lazily on
/// the next write.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::error::AppError;
use crate::store::TokenStore;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

#[derive(Default)]
pub struct InMemoryTokenStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), AppError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|seconds| now + Duration::from_secs(seconds)),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false))
    }
}
