use crate::domain_model::SessionToken;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("secure entropy source unavailable: {0}")]
    EntropySourceUnavailable(String),
    #[error("invalid token length: {0}")]
    InvalidLength(usize),
}

/// Source of opaque, unguessable session tokens.
///
/// Implementations must draw from a cryptographically secure source and fail
/// rather than fall back to anything weaker.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self, length: usize) -> Result<SessionToken, TokenError>;
}
