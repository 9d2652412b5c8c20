use crate::domain_model::*;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("payload codec error: {0}")]
    Codec(String),
}

/// Key/value store with per-key expiry that holds session payloads.
///
/// Every call is independent; no transaction spans two calls.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Atomic read. Never returns an entry whose TTL has elapsed.
    async fn get(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionPayload>, SessionStoreError>;

    /// Atomic write-with-expiry, `ttl` measured from the store's own clock.
    /// `Ok(false)` is a negative acknowledgment: nothing was written.
    async fn set(
        &self,
        token: &SessionToken,
        payload: &SessionPayload,
        ttl: Duration,
    ) -> Result<bool, SessionStoreError>;

    /// Remove the entry. Deleting an absent key is not an error.
    async fn delete(&self, token: &SessionToken) -> Result<(), SessionStoreError>;
}
