use crate::model::class::ClassId;
use crate::model::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::Candidate => "candidate",
        };
        f.write_str(name)
    }
}

/// One queued signaling record, addressed to exactly one receiver.
///
/// `payload` stays opaque on the relay: an SDP session description for
/// offers and answers, an ICE candidate descriptor for candidates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignalingMessage {
    pub id: Uuid,
    pub class_id: ClassId,
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub message_type: SignalKind,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
