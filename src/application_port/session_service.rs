use crate::domain_model::*;
use crate::domain_port::TokenError;
use serde::Deserialize;
use std::time::Duration;

pub const MIN_TOKEN_LENGTH: usize = 16;
pub const MAX_TOKEN_LENGTH: usize = 256;
/// Upper bound on `session_duration + grace_period`; keeps timestamp
/// arithmetic far from the calendar limits.
pub const MAX_SESSION_SPAN: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session creation failed: {0}")]
    CreationFailed(String),
    #[error("session not found")]
    NotFound,
    #[error("session logged out")]
    LoggedOut,
    #[error("session expired beyond grace period")]
    ExpiredBeyondGrace,
    #[error("secure entropy source unavailable: {0}")]
    EntropySourceUnavailable(String),
    #[error("store error: {0}")]
    Store(String),
}

impl SessionError {
    /// Whether the caller has to send the user back through login.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionError::NotFound | SessionError::LoggedOut | SessionError::ExpiredBeyondGrace
        )
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::EntropySourceUnavailable(e) => SessionError::EntropySourceUnavailable(e),
            TokenError::InvalidLength(len) => {
                SessionError::CreationFailed(format!("invalid token length: {len}"))
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionConfigError {
    #[error("session duration must be greater than zero")]
    ZeroDuration,
    #[error("token length {0} outside {min}..={max}", min = MIN_TOKEN_LENGTH, max = MAX_TOKEN_LENGTH)]
    TokenLength(usize),
    #[error("session duration plus grace period is out of range")]
    DurationOutOfRange,
}

/// What happens to the old token once a refresh has minted a new one.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Leave the old entry to its own TTL; it stays usable until its
    /// refresh deadline so requests already in flight do not fail.
    #[default]
    Overlap,
    /// Delete the old entry right after the new one is written.
    Revoke,
}

/// Immutable timing policy handed to the session manager at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    session_duration: Duration,
    grace_period: Duration,
    token_length: usize,
    rotation: RotationPolicy,
}

impl SessionConfig {
    pub fn new(
        session_duration: Duration,
        grace_period: Duration,
        token_length: usize,
    ) -> Result<Self, SessionConfigError> {
        if session_duration.is_zero() {
            return Err(SessionConfigError::ZeroDuration);
        }
        if !(MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&token_length) {
            return Err(SessionConfigError::TokenLength(token_length));
        }
        match session_duration.checked_add(grace_period) {
            Some(total) if total <= MAX_SESSION_SPAN => {}
            _ => return Err(SessionConfigError::DurationOutOfRange),
        }

        Ok(Self {
            session_duration,
            grace_period,
            token_length,
            rotation: RotationPolicy::default(),
        })
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn token_length(&self) -> usize {
        self.token_length
    }

    pub fn rotation(&self) -> RotationPolicy {
        self.rotation
    }

    /// TTL for store entries: the backing entry has to outlive the hard
    /// expiry by the whole grace window.
    pub fn store_ttl(&self) -> Duration {
        self.session_duration + self.grace_period
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VerifyOutcome {
    /// The presented token is still inside its validity window.
    Valid(SessionPayload),
    /// The presented token was in its grace window; this is the replacement
    /// and its token must be handed back to the client.
    Refreshed(SessionPayload),
}

impl VerifyOutcome {
    pub fn payload(&self) -> &SessionPayload {
        match self {
            VerifyOutcome::Valid(p) | VerifyOutcome::Refreshed(p) => p,
        }
    }

    pub fn into_payload(self) -> SessionPayload {
        match self {
            VerifyOutcome::Valid(p) | VerifyOutcome::Refreshed(p) => p,
        }
    }

    pub fn is_refreshed(&self) -> bool {
        matches!(self, VerifyOutcome::Refreshed(_))
    }
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Issue a session for a principal whose credentials were already checked.
    async fn create_session(&self, user_id: UserId) -> Result<SessionPayload, SessionError>;
    async fn verify_session(&self, token: &str) -> Result<VerifyOutcome, SessionError>;
    /// Explicit logout. Unknown tokens are accepted silently.
    async fn end_session(&self, token: &str) -> Result<(), SessionError>;
}
