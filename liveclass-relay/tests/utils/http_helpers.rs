use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

/// Runs one request through the router and returns status plus JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_signal(router: &Router, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    call(router, Method::POST, "/api/live-classes/signal", token, Some(body)).await
}

pub async fn poll_signals(router: &Router, token: Option<&str>, class_id: &str) -> (StatusCode, Value) {
    let uri = format!("/api/live-classes/signal?classId={}", class_id);
    call(router, Method::GET, &uri, token, None).await
}
