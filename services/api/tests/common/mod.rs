//! Shared helpers for the HTTP integration tests.
//!
//! The application is built exactly as the server binary builds it, backed
//! by a fresh in-memory store, and driven through `tower::ServiceExt`
//! without a TCP listener.

#![allow(dead_code)]

use std::sync::Arc;

use api_lib::config::Config;
use api_lib::web::{build_app, state::AppState};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use timetable_core::InMemoryDatabase;
use tower::ServiceExt;

/// Default configuration, as if no environment variable were set.
pub fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

pub fn build_test_app() -> Router {
    let state = Arc::new(AppState::new(Arc::new(InMemoryDatabase::new())));
    build_app(state, &test_config()).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, json: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(json)).await
}

pub async fn put_json(app: &Router, uri: &str, json: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(json)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Parses the response body as JSON. An empty body yields `Value::Null`.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// POSTs and returns the `id` of the created resource.
pub async fn create(app: &Router, uri: &str, json: Value) -> String {
    let response = post_json(app, uri, json).await;
    assert!(
        response.status().is_success(),
        "POST {uri} failed with {}",
        response.status()
    );
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// A class "Grade 7" with sections A and B, teachers Alice and Bob, and a
/// four-period grid (08:00-09:00, 09:00-10:00, break 10:00-10:30, 10:30-11:30).
pub struct School {
    pub class_id: String,
    pub section_a: String,
    pub section_b: String,
    pub alice: String,
    pub bob: String,
    pub periods: Vec<String>,
}

pub async fn seed_school(app: &Router) -> School {
    let class_id = create(app, "/classes", serde_json::json!({"name": "Grade 7"})).await;
    let section_a = create(
        app,
        "/sections",
        serde_json::json!({"classId": class_id, "name": "A"}),
    )
    .await;
    let section_b = create(
        app,
        "/sections",
        serde_json::json!({"classId": class_id, "name": "B"}),
    )
    .await;
    let alice = create(
        app,
        "/teachers",
        serde_json::json!({"name": "Alice", "subjects": ["Math"], "classIds": [class_id]}),
    )
    .await;
    let bob = create(
        app,
        "/teachers",
        serde_json::json!({"name": "Bob", "subjects": ["Science"], "classIds": [class_id]}),
    )
    .await;

    let applied = post_json(
        app,
        "/time-periods/apply",
        serde_json::json!({"periods": [
            {"periodName": "Period 1", "startTime": "08:00", "endTime": "09:00", "isBreak": false},
            {"periodName": "Period 2", "startTime": "09:00", "endTime": "10:00", "isBreak": false},
            {"periodName": "Lunch Break", "startTime": "10:00", "endTime": "10:30", "isBreak": true},
            {"periodName": "Period 3", "startTime": "10:30", "endTime": "11:30", "isBreak": false},
        ]}),
    )
    .await;
    let applied = body_json(applied).await;
    let periods = applied["periods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();

    School {
        class_id,
        section_a,
        section_b,
        alice,
        bob,
        periods,
    }
}
