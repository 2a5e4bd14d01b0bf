use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use library_server::{
    api,
    config::{AppConfig, SeedConfig, MEMORY_DATABASE_URL},
    repository::MemoryStore,
    services::{bootstrap, Services},
    AppState,
};

/// Router over a fresh memory store holding only the default accounts
pub async fn app() -> Router {
    let mut config = AppConfig::default();
    config.database.url = MEMORY_DATABASE_URL.to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.seed = SeedConfig {
        sample_catalog: false,
        ..SeedConfig::default()
    };

    let services = Services::new(Arc::new(MemoryStore::new()), &config.auth);
    bootstrap::seed(&services, &config.seed)
        .await
        .expect("Failed to seed accounts");

    api::create_router(AppState::new(config, services))
}

/// Send one request and return the status with the parsed JSON body (Null when empty)
pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}

pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", username, body);
    body["token"].as_str().expect("No token in response").to_string()
}
