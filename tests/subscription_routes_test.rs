// ABOUTME: Integration tests for following authors and the subscriptions feed
// ABOUTME: Self-subscription, duplicates, unsubscribe semantics and recipes_limit truncation
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
use serde_json::Value;

#[tokio::test]
async fn test_cannot_subscribe_to_self() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    AxumTestRequest::post(&format!("/api/users/{}/subscribe/", alice.id))
        .token(&alice.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let subscribed = app
        .resources
        .database
        .subscriptions()
        .is_subscribed(alice.id, alice.id)
        .await
        .unwrap();
    assert!(!subscribed);
}

#[tokio::test]
async fn test_subscribe_and_duplicate() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let flour = app.ingredient("flour", "g").await;
    app.recipe(&alice, "Pancakes", &[(flour, 200)], &[]).await;
    let uri = format!("/api/users/{}/subscribe/", alice.id);

    let body: Value = AxumTestRequest::post(&uri)
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(body["id"], alice.id);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 1);
    assert_eq!(body["recipes"][0]["name"], "Pancakes");

    AxumTestRequest::post(&uri)
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let profile: Value = AxumTestRequest::get(&format!("/api/users/{}/", alice.id))
        .token(&bob.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(profile["is_subscribed"], true);

    let anonymous: Value = AxumTestRequest::get(&format!("/api/users/{}/", alice.id))
        .send(app.router())
        .await
        .json();
    assert_eq!(anonymous["is_subscribed"], false);
}

#[tokio::test]
async fn test_subscribe_to_unknown_author() {
    let app = TestApp::new().await;
    let bob = app.register("bob").await;

    AxumTestRequest::post("/api/users/31337/subscribe/")
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsubscribe() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let uri = format!("/api/users/{}/subscribe/", alice.id);

    AxumTestRequest::delete(&uri)
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::post(&uri)
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);
    AxumTestRequest::delete(&uri)
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let feed: Value = AxumTestRequest::get("/api/users/subscriptions/")
        .token(&bob.token)
        .send(app.router())
        .await
        .json();
    assert_eq!(feed["count"], 0);
}

#[tokio::test]
async fn test_subscriptions_feed_respects_recipes_limit() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let carol = app.register("carol").await;
    let bob = app.register("bob").await;
    let flour = app.ingredient("flour", "g").await;
    for name in ["Bun", "Loaf", "Roll"] {
        app.recipe(&alice, name, &[(flour, 100)], &[]).await;
    }

    for author in [&alice, &carol] {
        AxumTestRequest::post(&format!("/api/users/{}/subscribe/", author.id))
            .token(&bob.token)
            .send(app.router())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let feed: Value = AxumTestRequest::get("/api/users/subscriptions/?recipes_limit=2")
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(feed["count"], 2);

    let entries = feed["results"].as_array().unwrap();
    let alice_entry = entries.iter().find(|e| e["id"] == alice.id).unwrap();
    assert_eq!(alice_entry["recipes_count"], 3);
    let recipes = alice_entry["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0]["name"], "Roll");

    let carol_entry = entries.iter().find(|e| e["id"] == carol.id).unwrap();
    assert_eq!(carol_entry["recipes_count"], 0);

    AxumTestRequest::get("/api/users/subscriptions/")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    AxumTestRequest::get("/api/users/subscriptions/?recipes_limit=lots")
        .token(&bob.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
