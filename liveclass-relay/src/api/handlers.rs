use crate::api::RelayService;
use crate::auth::Caller;
use crate::error::RelayError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use liveclass_core::{
    ClassId, IdentityResponse, PollQuery, PollResponse, RosterResponse, SendSignalRequest,
    SignalingMessage,
};

pub async fn health() -> &'static str {
    "ok"
}

pub async fn identity(Caller(participant_id): Caller) -> Json<IdentityResponse> {
    Json(IdentityResponse { participant_id })
}

pub async fn send_signal(
    Caller(sender): Caller,
    State(service): State<RelayService>,
    body: Result<Json<SendSignalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignalingMessage>), RelayError> {
    let Json(request) = body.map_err(|e| RelayError::invalid(e.body_text()))?;

    let message = service.send(sender, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn poll_signals(
    Caller(receiver): Caller,
    State(service): State<RelayService>,
    query: Result<Query<PollQuery>, QueryRejection>,
) -> Result<Json<PollResponse>, RelayError> {
    let Query(query) = query.map_err(|e| RelayError::invalid(e.body_text()))?;

    let messages = service.poll(receiver, query.class_id).await?;
    Ok(Json(PollResponse { messages }))
}

pub async fn class_roster(
    Caller(caller): Caller,
    State(service): State<RelayService>,
    Path(class_id): Path<String>,
) -> Result<Json<RosterResponse>, RelayError> {
    let class_id: ClassId = class_id
        .parse()
        .map_err(|e: liveclass_core::IdParseError| RelayError::invalid(e.to_string()))?;

    let participants = service.roster(caller, class_id).await?;
    Ok(Json(RosterResponse {
        class_id,
        participants,
    }))
}
