use liveclass_core::PayloadError;
use thiserror::Error;

/// Failures seen by a participant while negotiating through the relay.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// Session credential missing, invalid or expired. Ends negotiation.
    #[error("not authenticated with the relay")]
    Unauthenticated,

    #[error("relay rejected the request: {0}")]
    InvalidRequest(String),

    /// Retried on the next poll tick.
    #[error("relay unreachable: {0}")]
    TransientNetworkFailure(String),

    /// The received message cannot be applied; only that message is dropped.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("peer connection failure: {0}")]
    PeerConnection(String),
}

impl ClientError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Unauthenticated)
    }
}

impl From<PayloadError> for ClientError {
    fn from(e: PayloadError) -> Self {
        ClientError::MalformedPayload(e.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::TransientNetworkFailure(e.to_string())
    }
}
