#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use rolodex_api::{create_api_router, ApiConfig, AppState, StoreBackend};
use rolodex_storage::{InMemoryContactStore, SharedStore};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        store: StoreBackend::Memory,
        ..ApiConfig::default()
    }
}

/// A router over a fresh in-memory store, plus a handle to that store.
pub fn test_app() -> (Router, InMemoryContactStore) {
    test_app_with(test_config())
}

pub fn test_app_with(config: ApiConfig) -> (Router, InMemoryContactStore) {
    let memory = InMemoryContactStore::new();
    let store: SharedStore = Arc::new(memory.clone());
    (create_api_router(AppState::new(store, config)), memory)
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request");
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request");
    send(app, request).await
}

pub async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request");
    send(app, request).await
}

pub async fn post_multipart(app: &Router, uri: &str, body: Vec<u8>) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            rolodex_test_utils::multipart::content_type(),
        )
        .body(Body::from(body))
        .expect("valid request");
    send(app, request).await
}

/// Create a contact through the API and return its JSON.
pub async fn create(app: &Router, name: &str, email: &str, phone: &str) -> Value {
    let response = send_json(
        app,
        Method::POST,
        "/api/contacts",
        serde_json::json!({ "name": name, "email": email, "phone": phone }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json());
    response.json()
}
