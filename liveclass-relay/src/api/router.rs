use crate::api::RelayService;
use crate::api::handlers::{class_roster, health, identity, poll_signals, send_signal};
use axum::Router;
use axum::routing::get;
use liveclass_core::utils::{IDENTITY_PATH, SIGNAL_PATH};
use tower_http::trace::TraceLayer;

pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(IDENTITY_PATH, get(identity))
        .route(SIGNAL_PATH, get(poll_signals).post(send_signal))
        .route("/api/live-classes/{class_id}/participants", get(class_roster))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
