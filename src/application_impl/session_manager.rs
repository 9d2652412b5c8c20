use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Issues, verifies and silently renews opaque session tokens.
///
/// Holds nothing mutable besides its collaborators; all session state lives in
/// the [`SessionStore`], so one instance can be shared behind an `Arc` across
/// any number of tasks.
///
/// Verification splits time into three ordered, half-open intervals against a
/// single clock reading:
///
/// ```text
///  issued_at        expires_at        expires_at + grace
///      |--- Valid ------|--- Refreshable ---|--- ExpiredBeyondGrace -->
/// ```
///
/// Concurrent verifications of one token inside its grace window are not
/// serialized; each may mint its own replacement session.
pub struct SessionManager {
    config: SessionConfig,
    session_store: Arc<dyn SessionStore>,
    credential_recheck: Arc<dyn CredentialRecheck>,
    token_generator: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        session_store: Arc<dyn SessionStore>,
        credential_recheck: Arc<dyn CredentialRecheck>,
        token_generator: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            session_store,
            credential_recheck,
            token_generator,
            clock,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn issue(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<SessionPayload, SessionError> {
        let token = self.token_generator.generate(self.config.token_length())?;
        let payload = SessionPayload::new(token, user_id, now, self.config.session_duration());

        let acknowledged = self
            .session_store
            .set(&payload.token, &payload, self.config.store_ttl())
            .await
            .map_err(|e| {
                warn!(user_id = %payload.user_id, error = %e, "session store write failed");
                SessionError::CreationFailed(e.to_string())
            })?;
        if !acknowledged {
            warn!(user_id = %payload.user_id, "session store did not acknowledge write");
            return Err(SessionError::CreationFailed(
                "store did not acknowledge write".to_string(),
            ));
        }

        info!(
            user_id = %payload.user_id,
            expires_at = %payload.expires_at,
            "session created"
        );
        Ok(payload)
    }

    async fn refresh(
        &self,
        old: SessionPayload,
        now: DateTime<Utc>,
    ) -> Result<SessionPayload, SessionError> {
        match self.credential_recheck.check(&old.user_id).await {
            Ok(true) => {}
            Ok(false) => {
                info!(user_id = %old.user_id, "renewal denied by credential recheck");
                return Err(SessionError::LoggedOut);
            }
            Err(e) => {
                warn!(user_id = %old.user_id, error = %e, "credential recheck failed");
                return Err(SessionError::LoggedOut);
            }
        }

        let fresh = self.issue(old.user_id.clone(), now).await?;

        if self.config.rotation() == RotationPolicy::Revoke {
            // replacement is already stored; a leftover old entry still dies
            // at its own refresh deadline
            if let Err(e) = self.session_store.delete(&old.token).await {
                warn!(user_id = %old.user_id, error = %e, "failed to revoke rotated session");
            }
        }

        info!(
            user_id = %fresh.user_id,
            previous_expires_at = %old.expires_at,
            expires_at = %fresh.expires_at,
            "session refreshed"
        );
        Ok(fresh)
    }
}

#[async_trait::async_trait]
impl SessionService for SessionManager {
    async fn create_session(&self, user_id: UserId) -> Result<SessionPayload, SessionError> {
        let now = self.clock.now();
        self.issue(user_id, now).await
    }

    async fn verify_session(&self, token: &str) -> Result<VerifyOutcome, SessionError> {
        if token.is_empty() {
            return Err(SessionError::NotFound);
        }
        let token = SessionToken::from(token);

        let payload = self
            .session_store
            .get(&token)
            .await
            .map_err(|e| {
                warn!(error = %e, "session store read failed");
                SessionError::Store(e.to_string())
            })?
            .ok_or(SessionError::NotFound)?;

        if payload.token != token {
            warn!(user_id = %payload.user_id, "stored session does not match its key");
            return Err(SessionError::NotFound);
        }

        let now = self.clock.now();
        match payload.phase(now, self.config.grace_period()) {
            SessionPhase::Valid => {
                debug!(user_id = %payload.user_id, "session valid");
                Ok(VerifyOutcome::Valid(payload))
            }
            SessionPhase::Refreshable => self
                .refresh(payload, now)
                .await
                .map(VerifyOutcome::Refreshed),
            SessionPhase::ExpiredBeyondGrace => {
                debug!(
                    user_id = %payload.user_id,
                    expires_at = %payload.expires_at,
                    "session expired beyond grace period"
                );
                Err(SessionError::ExpiredBeyondGrace)
            }
        }
    }

    async fn end_session(&self, token: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Ok(());
        }
        self.session_store
            .delete(&SessionToken::from(token))
            .await
            .map_err(|e| {
                warn!(error = %e, "session store delete failed");
                SessionError::Store(e.to_string())
            })?;
        info!("session ended");
        Ok(())
    }
}
