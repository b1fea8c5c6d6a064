//! Shared helpers for the integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use engram::config::SrsConfig;
use engram::{create_app, AppState};

/// Builds an app backed by a fresh empty store
pub fn test_app() -> Router {
    let state = Arc::new(AppState::new(SrsConfig::default()));
    create_app(state)
}

/// Sends a request with a JSON body and returns the status and parsed body
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Sends a bodyless GET request and returns the status and parsed body
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Creates a question item linked to a unit and returns its ID
pub async fn create_question(app: &Router, unit_key: &str, prompt: &str) -> String {
    let (status, item) = send_json(
        app,
        "POST",
        "/items",
        serde_json::json!({
            "kind": "question",
            "prompt": prompt,
            "unit_key": unit_key,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    item["id"].as_str().unwrap().to_string()
}

/// Records a review and returns the updated item
pub async fn review(
    app: &Router,
    item_id: &str,
    was_correct: bool,
    rating: i32,
    response_secs: f64,
) -> Value {
    let (status, body) = send_json(
        app,
        "POST",
        "/reviews",
        serde_json::json!({
            "item_id": item_id,
            "was_correct": was_correct,
            "rating": rating,
            "response_secs": response_secs,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["item"].clone()
}
