use async_trait::async_trait;
use liveclass_core::{ClassId, ParticipantId, SignalKind, SignalingMessage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signal store unavailable: {0}")]
    Unavailable(String),
}

/// A validated signal that has not been assigned an id or timestamp yet.
#[derive(Debug, Clone)]
pub struct NewSignal {
    pub class_id: ClassId,
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub message_type: SignalKind,
    pub payload: serde_json::Value,
}

/// Short-lived mailbox keyed by (class, receiver).
///
/// `drain` is the store's only concurrency contract: the records it returns
/// are removed in the same step, so each record is handed out at most once.
/// A record inserted while a drain is running either lands in that drain or
/// stays for the next one; it is never lost.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn insert(&self, signal: NewSignal) -> Result<SignalingMessage, StoreError>;

    /// Removes and returns every live record for `receiver_id` in `class_id`,
    /// oldest first.
    async fn drain(
        &self,
        class_id: &ClassId,
        receiver_id: &ParticipantId,
    ) -> Result<Vec<SignalingMessage>, StoreError>;

    /// Drops records older than the TTL. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, StoreError>;

    /// Number of records currently held, expired ones included.
    async fn pending(&self) -> usize;
}
