use async_trait::async_trait;
use liveclass_core::{ClassId, ParticipantId, SendSignalRequest, SignalingMessage};

use crate::error::ClientError;

/// The relay as seen by one authenticated participant.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    async fn send(&self, request: SendSignalRequest) -> Result<SignalingMessage, ClientError>;

    /// Everything queued for the caller in `class_id`, oldest first. The
    /// returned messages are gone from the relay.
    async fn poll(&self, class_id: &ClassId) -> Result<Vec<SignalingMessage>, ClientError>;
}

/// Class membership, and the caller's own identity as the relay resolves it
/// from the session token.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn identity(&self) -> Result<ParticipantId, ClientError>;

    async fn participants(&self, class_id: &ClassId) -> Result<Vec<ParticipantId>, ClientError>;
}
