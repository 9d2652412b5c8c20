use crate::domain_model::SessionToken;
use crate::domain_port::{TokenError, TokenGenerator};
use rand::TryRngCore;
use rand::rngs::OsRng;

/// URL-safe alphabet; 64 symbols so the low six bits of a byte index it
/// without bias.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Token generator backed by the operating system RNG.
///
/// Each character carries 6 bits of entropy, so the default 32-character
/// token is 192 bits. If the OS source cannot be read, generation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngTokenGenerator;

impl OsRngTokenGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TokenGenerator for OsRngTokenGenerator {
    fn generate(&self, length: usize) -> Result<SessionToken, TokenError> {
        if length == 0 {
            return Err(TokenError::InvalidLength(length));
        }

        let mut bytes = vec![0u8; length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::EntropySourceUnavailable(e.to_string()))?;

        let token: String = bytes
            .iter()
            .map(|b| ALPHABET[(b & 0x3f) as usize] as char)
            .collect();
        Ok(SessionToken(token))
    }
}
