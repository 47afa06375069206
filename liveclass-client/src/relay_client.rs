use async_trait::async_trait;
use liveclass_core::utils::{IDENTITY_PATH, SIGNAL_PATH, roster_path};
use liveclass_core::{
    ClassId, ErrorBody, IdentityResponse, ParticipantId, PollResponse, RosterResponse,
    SendSignalRequest, SignalingMessage,
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::ClientError;
use crate::transport::{RosterSource, SignalingTransport};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the relay, authenticated with a bearer session token.
#[derive(Clone)]
pub struct HttpRelayClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRelayClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::InvalidRequest(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(status_error(status, reason))
    }
}

/// Maps a relay rejection onto the client error taxonomy.
pub fn status_error(status: StatusCode, reason: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthenticated,
        StatusCode::BAD_REQUEST
        | StatusCode::FORBIDDEN
        | StatusCode::NOT_FOUND
        | StatusCode::UNPROCESSABLE_ENTITY => ClientError::InvalidRequest(reason),
        other => ClientError::TransientNetworkFailure(format!("{}: {}", other, reason)),
    }
}

#[async_trait]
impl SignalingTransport for HttpRelayClient {
    async fn send(&self, request: SendSignalRequest) -> Result<SignalingMessage, ClientError> {
        debug!("POST {} {} -> {}", SIGNAL_PATH, request.message_type, request.receiver_id);
        let response = self
            .http
            .post(self.url(SIGNAL_PATH))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn poll(&self, class_id: &ClassId) -> Result<Vec<SignalingMessage>, ClientError> {
        let response = self
            .http
            .get(self.url(SIGNAL_PATH))
            .bearer_auth(&self.token)
            .query(&[("classId", class_id.to_string())])
            .send()
            .await?;
        let body: PollResponse = Self::read(response).await?;
        Ok(body.messages)
    }
}

#[async_trait]
impl RosterSource for HttpRelayClient {
    async fn identity(&self) -> Result<ParticipantId, ClientError> {
        let response = self
            .http
            .get(self.url(IDENTITY_PATH))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body: IdentityResponse = Self::read(response).await?;
        Ok(body.participant_id)
    }

    async fn participants(&self, class_id: &ClassId) -> Result<Vec<ParticipantId>, ClientError> {
        let response = self
            .http
            .get(self.url(&roster_path(class_id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body: RosterResponse = Self::read(response).await?;
        Ok(body.participants)
    }
}
