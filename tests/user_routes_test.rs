// ABOUTME: Integration tests for registration, token login/logout and profile routes
// ABOUTME: Covers duplicate accounts, bad credentials, token revocation and password change
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{TestApp, TEST_PASSWORD};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_returns_public_fields_only() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::post("/api/users/")
        .json(&json!({
            "email": "vasya@example.org",
            "username": "vasya",
            "first_name": "Vasya",
            "last_name": "Pupkin",
            "password": TEST_PASSWORD,
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(body["username"], "vasya");
    assert_eq!(body["email"], "vasya@example.org");
    assert!(body["id"].is_i64());
    assert!(body.get("password").is_none());
    assert!(body.get("is_subscribed").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let body: Value = AxumTestRequest::post("/api/users/")
        .json(&json!({
            "email": "alice@example.org",
            "username": "alice2",
            "first_name": "Alice",
            "last_name": "Again",
            "password": TEST_PASSWORD,
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["error"]["details"]["field"], "email");
}

#[tokio::test]
async fn test_register_validates_fields() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::post("/api/users/")
        .json(&json!({
            "email": "not-an-email",
            "username": "bob",
            "first_name": "Bob",
            "last_name": "Builder",
            "password": TEST_PASSWORD,
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["error"]["details"]["field"], "email");

    AxumTestRequest::post("/api/users/")
        .json(&json!({
            "email": "bob@example.org",
            "username": "bob",
            "first_name": "Bob",
            "last_name": "Builder",
            "password": "short",
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Token login / logout
// ============================================================================

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    AxumTestRequest::post("/api/auth/token/login/")
        .json(&json!({ "email": alice.email, "password": "wrong-password" }))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/auth/token/login/")
        .json(&json!({ "email": "nobody@example.org", "password": TEST_PASSWORD }))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    AxumTestRequest::get("/api/users/me/")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    AxumTestRequest::get("/api/users/me/")
        .token("garbage")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let me: Value = AxumTestRequest::get("/api/users/me/")
        .header("authorization", &format!("Bearer {}", alice.token))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["id"], alice.id);
    assert_eq!(me["is_subscribed"], false);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    AxumTestRequest::post("/api/auth/token/logout/")
        .token(&alice.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get("/api/users/me/")
        .token(&alice.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // A fresh login still works
    let token = app.login(&alice.email, TEST_PASSWORD).await;
    AxumTestRequest::get("/api/users/me/")
        .token(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_set_password() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    AxumTestRequest::post("/api/users/set_password/")
        .token(&alice.token)
        .json(&json!({ "current_password": "not-it-at-all", "new_password": "An0ther-secret" }))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/users/set_password/")
        .token(&alice.token)
        .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "An0ther-secret" }))
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::post("/api/auth/token/login/")
        .json(&json!({ "email": alice.email, "password": TEST_PASSWORD }))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.login(&alice.email, "An0ther-secret").await;
}

// ============================================================================
// Profiles and listing
// ============================================================================

#[tokio::test]
async fn test_user_list_is_paginated() {
    let app = TestApp::new().await;
    for name in ["u1", "u2", "u3"] {
        app.register(name).await;
    }

    let page: Value = AxumTestRequest::get("/api/users/?limit=2")
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["next"], "/api/users/?limit=2&page=2");
    assert!(page["previous"].is_null());

    let last: Value = AxumTestRequest::get("/api/users/?limit=2&page=2")
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(last["results"].as_array().unwrap().len(), 1);
    assert!(last["next"].is_null());

    AxumTestRequest::get("/api/users/?limit=2&page=3")
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let app = TestApp::new().await;

    AxumTestRequest::get("/api/users/999/")
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
