use crate::model::class::ClassId;
use crate::model::participant::ParticipantId;
use crate::model::signaling::{SignalKind, SignalingMessage};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/live-classes/signal`. The sender is never part of the
/// body; the relay takes it from the caller's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSignalRequest {
    pub class_id: ClassId,
    pub receiver_id: ParticipantId,
    pub message_type: SignalKind,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollQuery {
    pub class_id: ClassId,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PollResponse {
    pub messages: Vec<SignalingMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub class_id: ClassId,
    pub participants: Vec<ParticipantId>,
}

/// Body of `GET /api/live-classes/me`: who the relay thinks the caller is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub participant_id: ParticipantId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
