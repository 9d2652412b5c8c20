use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum RecheckError {
    #[error("credential backend unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Lightweight eligibility check run before a session is silently renewed,
/// e.g. confirming the account is still active and not revoked.
#[async_trait::async_trait]
pub trait CredentialRecheck: Send + Sync {
    async fn check(&self, user_id: &UserId) -> Result<bool, RecheckError>;
}
