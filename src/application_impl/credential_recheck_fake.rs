use crate::domain_model::UserId;
use crate::domain_port::{CredentialRecheck, RecheckError};
use dashmap::DashSet;

/// In-process recheck that passes everyone except explicitly revoked users.
///
/// Meant for tests, demos and deployments where revocation is driven from
/// settings rather than a user database.
#[derive(Debug, Default)]
pub struct StaticCredentialRecheck {
    revoked: DashSet<UserId>,
}

impl StaticCredentialRecheck {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn with_revoked(revoked: impl IntoIterator<Item = UserId>) -> Self {
        let this = Self::default();
        for user_id in revoked {
            this.revoked.insert(user_id);
        }
        this
    }

    pub fn revoke(&self, user_id: UserId) {
        self.revoked.insert(user_id);
    }

    pub fn reinstate(&self, user_id: &UserId) {
        self.revoked.remove(user_id);
    }
}

#[async_trait::async_trait]
impl CredentialRecheck for StaticCredentialRecheck {
    async fn check(&self, user_id: &UserId) -> Result<bool, RecheckError> {
        Ok(!self.revoked.contains(user_id))
    }
}
