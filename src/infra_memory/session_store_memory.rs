use crate::application_impl::SystemClock;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

const MIN_TTL: Duration = Duration::from_millis(1);

struct StoredEntry {
    payload: SessionPayload,
    evict_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.evict_at
    }
}

/// In-process session store with lazy TTL eviction.
///
/// Writes behave like Redis `SET .. PX .. NX`: a live entry under the same
/// key is never overwritten. Expiry is judged against the injected clock,
/// which need not be the one the session manager reads.
pub struct MemorySessionStore {
    entries: DashMap<String, StoredEntry>,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Drop every entry whose TTL has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.is_live(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of entries held, expired-but-unswept ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionPayload>, SessionStoreError> {
        let now = self.clock.now();
        match self.entries.get(token.as_str()) {
            None => return Ok(None),
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.payload.clone())),
            Some(_) => {}
        };
        // expired: the read guard is released above, evict lazily
        self.entries
            .remove_if(token.as_str(), |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn set(
        &self,
        token: &SessionToken,
        payload: &SessionPayload,
        ttl: Duration,
    ) -> Result<bool, SessionStoreError> {
        let now = self.clock.now();
        // TTLs past the calendar end pin the entry until the end of time
        let evict_at = TimeDelta::from_std(ttl.max(MIN_TTL))
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut inserted = false;
        let mut slot = self
            .entries
            .entry(token.as_str().to_string())
            .or_insert_with(|| {
                inserted = true;
                StoredEntry {
                    payload: payload.clone(),
                    evict_at,
                }
            });
        if inserted {
            return Ok(true);
        }
        if slot.is_live(now) {
            return Ok(false);
        }
        *slot = StoredEntry {
            payload: payload.clone(),
            evict_at,
        };
        Ok(true)
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        self.entries.remove(token.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::ManualClock;

    fn setup() -> (Arc<ManualClock>, MemorySessionStore) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        ));
        let store = MemorySessionStore::new(clock.clone());
        (clock, store)
    }

    fn payload(token: &str, now: DateTime<Utc>) -> SessionPayload {
        SessionPayload::new(
            SessionToken::from(token),
            UserId::from(7),
            now,
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_set_then_get_returns_payload() {
        let (clock, store) = setup();
        let p = payload("a", clock.now());

        assert!(store.set(&p.token, &p, Duration::from_secs(1)).await.unwrap());

        assert_eq!(store.get(&p.token).await.unwrap(), Some(p));
    }

    #[tokio::test]
    async fn test_get_after_ttl_returns_none_and_evicts() {
        let (clock, store) = setup();
        let p = payload("a", clock.now());
        store.set(&p.token, &p, Duration::from_millis(500)).await.unwrap();

        clock.advance(Duration::from_millis(499));
        assert!(store.get(&p.token).await.unwrap().is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get(&p.token).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_set_unbounded_ttl_keeps_entry() {
        let (clock, store) = setup();
        let p = payload("forever", clock.now());

        assert!(store.set(&p.token, &p, Duration::MAX).await.unwrap());
        clock.advance(Duration::from_secs(10 * 365 * 24 * 60 * 60));

        assert_eq!(store.get(&p.token).await.unwrap(), Some(p));
        assert_eq!(store.purge_expired(), 0);
    }

    #[tokio::test]
    async fn test_set_live_key_is_not_overwritten() {
        let (clock, store) = setup();
        let first = payload("dup", clock.now());
        let mut second = payload("dup", clock.now());
        second.user_id = UserId::from(8);

        assert!(store.set(&first.token, &first, Duration::from_secs(1)).await.unwrap());
        assert!(!store.set(&second.token, &second, Duration::from_secs(1)).await.unwrap());

        assert_eq!(store.get(&first.token).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_set_expired_key_is_replaced() {
        let (clock, store) = setup();
        let first = payload("k", clock.now());
        store.set(&first.token, &first, Duration::from_millis(10)).await.unwrap();
        clock.advance(Duration::from_millis(10));

        let second = payload("k", clock.now());
        assert!(store.set(&second.token, &second, Duration::from_secs(1)).await.unwrap());

        assert_eq!(store.get(&second.token).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_delete_removes_entry_and_ignores_unknown() {
        let (clock, store) = setup();
        let p = payload("a", clock.now());
        store.set(&p.token, &p, Duration::from_secs(1)).await.unwrap();

        store.delete(&p.token).await.unwrap();
        store.delete(&SessionToken::from("never-set")).await.unwrap();

        assert!(store.get(&p.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired_removes_only_dead_entries() {
        let (clock, store) = setup();
        let short = payload("short", clock.now());
        let long = payload("long", clock.now());
        store.set(&short.token, &short, Duration::from_millis(10)).await.unwrap();
        store.set(&long.token, &long, Duration::from_secs(10)).await.unwrap();
        clock.advance(Duration::from_millis(20));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&long.token).await.unwrap().is_some());
    }
}
