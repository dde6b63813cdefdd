// ABOUTME: Integration tests for the assembled router and its middleware stack
// ABOUTME: Health check, request-id propagation and media file serving
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::TestApp;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_reports_ok() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::get("/health")
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let app = TestApp::new().await;

    let generated = AxumTestRequest::get("/api/tags/").send(app.router()).await;
    let id = generated.header("x-request-id").unwrap();
    assert_eq!(id.len(), 36);

    let echoed = AxumTestRequest::get("/api/tags/")
        .header("x-request-id", "trace-me-123")
        .send(app.router())
        .await;
    assert_eq!(echoed.header("x-request-id"), Some("trace-me-123"));
}

#[tokio::test]
async fn test_uploaded_image_is_served() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let flour = app.ingredient("flour", "g").await;
    let recipe = app.recipe(&alice, "Bread", &[(flour, 200)], &[]).await;

    let image = recipe["image"].as_str().unwrap();
    let response = AxumTestRequest::get(image)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("image/png"));

    AxumTestRequest::get("/media/recipes/missing.png")
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_errors_use_json_envelope() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::get("/api/users/me/")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = TestApp::with_config(|config| config.http.max_body_bytes = 1024).await;

    let response = AxumTestRequest::post("/api/users/")
        .json(&json!({
            "email": "big@example.org",
            "username": "big",
            "first_name": "x".repeat(4096),
            "last_name": "User",
            "password": "Sup3r-secret",
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.header("x-request-id").is_some());

    AxumTestRequest::get("/health")
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
}
