/// Revocation List Management
///
/// Revoked tokens are tracked by their `jti` in the key-value store under
/// `blacklist:<jti>`, with a TTL equal to the token's remaining lifetime so
/// entries disappear together with the tokens they block. Entries are
/// write-once; an idempotent overwrite is harmless.
///
/// Token lifecycle: ISSUED -> VALID -> {EXPIRED | REVOKED}, terminal.

use std::sync::Arc;

use chrono::Utc;

use crate::error::AppError;
use crate::store::TokenStore;

const BLACKLIST_PREFIX: &str = "blacklist:";

/// Handle to the revocation list. The store is injected at construction;
/// clones share the same underlying store.
#[derive(Clone)]
pub struct RevocationList {
    store: Arc<dyn TokenStore>,
}

impl RevocationList {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    fn key(jti: &str) -> String {
        format!("{}{}", BLACKLIST_PREFIX, jti)
    }

    /// Revoke the token identified by `jti`, expiring the entry at
    /// `expires_at` (Unix timestamp, the token's own `exp`).
    ///
    /// A token already past its expiry is not inserted at all: the
    /// verifier rejects it on the expiry check, and a TTL-less entry would
    /// never self-clean from the store.
    pub async fn revoke(&self, jti: &str, expires_at: i64) -> Result<(), AppError> {
        let ttl = (expires_at - Utc::now().timestamp()).max(0) as u64;
        if ttl == 0 {
            tracing::debug!(jti = %jti, "Token already expired; skipping revocation entry");
            return Ok(());
        }

        self.store.set(&Self::key(jti), "1", Some(ttl)).await?;
        tracing::info!(jti = %jti, ttl_seconds = ttl, "Token revoked");
        Ok(())
    }

    /// Check whether `jti` is on the revocation list.
    pub async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        self.store.exists(&Self::key(jti)).await
    }
}
