use crate::model::signaling::SignalKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("{kind} payload is not valid: {source}")]
    Decode {
        kind: SignalKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} payload carries a '{found}' description")]
    KindMismatch { kind: SignalKind, found: SdpKind },

    #[error("{kind} payload is empty")]
    Empty { kind: SignalKind },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

impl std::fmt::Display for SdpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SdpKind::Offer => f.write_str("offer"),
            SdpKind::Answer => f.write_str("answer"),
        }
    }
}

/// Browser-shaped `RTCSessionDescriptionInit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }

    /// Decodes the payload of an `offer` or `answer` message and checks that
    /// the embedded description type agrees with the message type.
    pub fn from_payload(
        kind: SignalKind,
        payload: &serde_json::Value,
    ) -> Result<Self, PayloadError> {
        let desc: SessionDescription = serde_json::from_value(payload.clone())
            .map_err(|source| PayloadError::Decode { kind, source })?;

        let expected = match kind {
            SignalKind::Offer => SdpKind::Offer,
            _ => SdpKind::Answer,
        };
        if desc.kind != expected {
            return Err(PayloadError::KindMismatch {
                kind,
                found: desc.kind,
            });
        }
        if desc.sdp.trim().is_empty() {
            return Err(PayloadError::Empty { kind });
        }
        Ok(desc)
    }

    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Browser-shaped `RTCIceCandidateInit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default)]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            ..Default::default()
        }
    }

    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, PayloadError> {
        serde_json::from_value(payload.clone()).map_err(|source| PayloadError::Decode {
            kind: SignalKind::Candidate,
            source,
        })
    }

    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
