use crate::domain_model::*;
use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, token: &SessionToken) -> String {
        session_key(&self.prefix, token)
    }
}

fn session_key(prefix: &str, token: &SessionToken) -> String {
    format!("{}:{}", prefix, token.as_str())
}

/// Redis `PX` takes whole milliseconds and rejects zero.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionPayload>, SessionStoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        match raw {
            Some(json) => {
                let payload = serde_json::from_str(&json)
                    .map_err(|e| SessionStoreError::Codec(e.to_string()))?;
                Ok(Some(payload))
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        token: &SessionToken,
        payload: &SessionPayload,
        ttl: Duration,
    ) -> Result<bool, SessionStoreError> {
        let key = self.key(token);
        let json =
            serde_json::to_string(payload).map_err(|e| SessionStoreError::Codec(e.to_string()))?;
        let mut conn = self.conn.clone();
        // NX: a token collision must never overwrite a live session
        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(json)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        Ok(reply.is_some())
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_joins_prefix_and_token() {
        let key = session_key("session:dev", &SessionToken::from("abc"));

        assert_eq!(key, "session:dev:abc");
    }

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(ttl_millis(Duration::ZERO), 1);
        assert_eq!(ttl_millis(Duration::from_micros(300)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(110)), 110_000);
    }

    /// Runs against a live server: `TOKENWARD_REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored`
    #[tokio::test]
    #[ignore = "needs a running redis server"]
    async fn test_redis_store_set_get_delete() {
        let url = std::env::var("TOKENWARD_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let client = redis::Client::open(url).unwrap();
        let conn = client.get_connection_manager().await.unwrap();
        let store = RedisSessionStore::new(conn, "tokenward-test");

        let payload = SessionPayload::new(
            SessionToken::from("redis-roundtrip-token"),
            UserId::from(42),
            chrono::Utc::now(),
            Duration::from_secs(60),
        );
        store.delete(&payload.token).await.unwrap();

        assert!(store.set(&payload.token, &payload, Duration::from_secs(5)).await.unwrap());
        assert!(!store.set(&payload.token, &payload, Duration::from_secs(5)).await.unwrap());
        assert_eq!(store.get(&payload.token).await.unwrap(), Some(payload.clone()));

        store.delete(&payload.token).await.unwrap();
        assert!(store.get(&payload.token).await.unwrap().is_none());
    }
}
