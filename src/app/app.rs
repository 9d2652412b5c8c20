use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Session service wired from settings, plus the background work it owns.
pub struct App {
    pub session_service: Arc<dyn SessionService>,
    janitor_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl App {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let config = SessionConfig::try_from(&settings.session)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cancel = CancellationToken::new();
        let mut janitor_handle = None;

        let credential_recheck: Arc<dyn CredentialRecheck> =
            match settings.recheck.backend.as_str() {
                "allow_all" => Arc::new(StaticCredentialRecheck::allow_all()),
                "static" => Arc::new(StaticCredentialRecheck::with_revoked(
                    settings
                        .recheck
                        .revoked
                        .iter()
                        .map(|id| UserId::from(id.as_str())),
                )),
                other => return Err(anyhow!("Unknown recheck backend: {}", other)),
            };

        let session_store: Arc<dyn SessionStore> = match settings.store.backend.as_str() {
            "memory" => {
                let store = Arc::new(MemorySessionStore::new(clock.clone()));
                let every = Duration::from_millis(settings.store.purge_interval_ms.max(1));
                janitor_handle = Some(tokio::spawn(run_janitor(
                    store.clone(),
                    every,
                    cancel.clone(),
                )));
                store
            }
            "redis" => {
                let url = settings
                    .store
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.redis_url is required for the redis backend"))?;
                let redis_client = redis::Client::open(url)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisSessionStore::new(
                    redis_manager,
                    settings.store.key_prefix.clone(),
                ))
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        let session_service: Arc<dyn SessionService> = Arc::new(SessionManager::new(
            config,
            session_store,
            credential_recheck,
            Arc::new(OsRngTokenGenerator::new()),
            clock,
        ));

        info!(
            store = %settings.store.backend,
            recheck = %settings.recheck.backend,
            "session service ready"
        );

        Ok(Self {
            session_service,
            janitor_handle: Mutex::new(janitor_handle),
            cancel,
        })
    }

    pub async fn shutdown(&self) {
        info!("session service shutting down...");

        self.cancel.cancel();

        let handle = self
            .janitor_handle
            .lock()
            .ok()
            .and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("janitor handle dropped: {:?}", r);
        }
    }
}

async fn run_janitor(store: Arc<MemorySessionStore>, every: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!(removed, remaining = store.len(), "purged expired sessions");
                }
            }
        }
    }
}
