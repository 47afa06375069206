use crate::api::RelayService;
use crate::auth::credentials::Credentials;
use crate::error::RelayError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use liveclass_core::ParticipantId;

/// The authenticated participant behind a request.
///
/// This is the only place the relay learns who the sender (on `send`) or the
/// receiver (on `poll`) is; bodies and query strings are never trusted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub ParticipantId);

impl FromRequestParts<RelayService> for Caller {
    type Rejection = RelayError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &RelayService,
    ) -> Result<Self, Self::Rejection> {
        let credentials =
            Credentials::from_headers(&parts.headers).ok_or(RelayError::Unauthenticated)?;
        let participant = service.identity().authenticate(&credentials).await?;
        Ok(Caller(participant))
    }
}
