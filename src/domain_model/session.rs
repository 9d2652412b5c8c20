use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque session identifier and store key.
///
/// `Debug` never prints the token itself, so a payload can be logged with
/// `?payload` without handing out a live credential.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<redacted, {} chars>)", self.0.len())
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        SessionToken(token.to_string())
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        SessionToken(token)
    }
}

/// Where a payload sits on its timeline for a given instant.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionPhase {
    /// `now < expires_at`
    Valid,
    /// `expires_at <= now < expires_at + grace`
    Refreshable,
    /// `now >= expires_at + grace`
    ExpiredBeyondGrace,
}

/// The unit of session state kept in the store under its own token.
///
/// Payloads are never edited after issuance; a refresh produces a new one.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub token: SessionToken,
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionPayload {
    pub fn new(
        token: SessionToken,
        user_id: UserId,
        issued_at: DateTime<Utc>,
        session_duration: Duration,
    ) -> Self {
        Self {
            token,
            user_id,
            issued_at,
            expires_at: issued_at + session_duration,
        }
    }

    /// Last instant (exclusive) at which this payload may be silently renewed.
    pub fn refresh_deadline(&self, grace_period: Duration) -> DateTime<Utc> {
        self.expires_at + grace_period
    }

    pub fn phase(&self, now: DateTime<Utc>, grace_period: Duration) -> SessionPhase {
        if now < self.expires_at {
            SessionPhase::Valid
        } else if now < self.refresh_deadline(grace_period) {
            SessionPhase::Refreshable
        } else {
            SessionPhase::ExpiredBeyondGrace
        }
    }
}
