use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use liveclass_core::{ClassId, ErrorBody, ParticipantId};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("class {0} does not exist")]
    UnknownClass(ClassId),

    #[error("participant {participant} is not enrolled in class {class_id}")]
    NotEnrolled {
        class_id: ClassId,
        participant: ParticipantId,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelayError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::UnknownClass(_) => StatusCode::NOT_FOUND,
            RelayError::NotEnrolled { .. } => StatusCode::FORBIDDEN,
            RelayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Unauthenticated => "unauthenticated",
            RelayError::InvalidRequest(_) => "invalid_request",
            RelayError::UnknownClass(_) => "unknown_class",
            RelayError::NotEnrolled { .. } => "not_enrolled",
            RelayError::Store(_) => "store_unavailable",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::Store(e) => error!("Signal store failure: {}", e),
            RelayError::Unauthenticated => {}
            other => warn!("Rejected signaling request: {}", other),
        }

        let body = ErrorBody {
            error: self.code().to_owned(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
