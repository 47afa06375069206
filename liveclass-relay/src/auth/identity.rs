use crate::auth::credentials::Credentials;
use crate::error::RelayError;
use async_trait::async_trait;
use dashmap::DashMap;
use liveclass_core::ParticipantId;

/// The authenticated-user lookup the relay depends on: turn request
/// credentials into a stable participant id, or fail with `Unauthenticated`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<ParticipantId, RelayError>;
}

/// Opaque session tokens mapped to participants.
#[derive(Default)]
pub struct TokenRegistry {
    tokens: DashMap<String, ParticipantId>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, participant: ParticipantId) {
        self.tokens.insert(token.into(), participant);
    }

    pub fn revoke(&self, token: &str) -> Option<ParticipantId> {
        self.tokens.remove(token).map(|(_, id)| id)
    }
}

#[async_trait]
impl IdentityProvider for TokenRegistry {
    async fn authenticate(&self, credentials: &Credentials) -> Result<ParticipantId, RelayError> {
        self.tokens
            .get(&credentials.token)
            .map(|entry| *entry.value())
            .ok_or(RelayError::Unauthenticated)
    }
}
