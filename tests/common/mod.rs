// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, full router, and user/tag/ingredient/recipe fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `foodgram_server`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};

use axum::{http::StatusCode, Router};
use foodgram_server::{
    config::ServerConfig,
    database::Database,
    models::{NewIngredient, NewTag, NewUser, UserRole},
    resources::ServerResources,
    server::build_router,
};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::helpers::axum_test::AxumTestRequest;

static INIT_LOGGER: Once = Once::new();

/// 1x1 transparent PNG
pub const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Password used by every fixture account
pub const TEST_PASSWORD: &str = "Sup3r-secret";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// A fully wired application over an in-memory database
pub struct TestApp {
    /// Shared resources, for direct database access in tests
    pub resources: Arc<ServerResources>,
    router: Router,
    media: TempDir,
    tags_created: AtomicU32,
}

/// Registered fixture account
pub struct TestUser {
    /// User ID
    pub id: i64,
    /// Email
    pub email: String,
    /// Auth token
    pub token: String,
}

impl TestApp {
    /// Build the app with a fresh database and media directory
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build the app after adjusting the test configuration
    pub async fn with_config(adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        init_test_logging();
        let media = TempDir::new().expect("Failed to create media directory");
        let mut config = ServerConfig::for_testing(media.path().to_path_buf());
        adjust(&mut config);
        let database = Database::new(&config.database_url)
            .await
            .expect("Failed to open test database");
        let resources = Arc::new(ServerResources::new(database, config));
        let router = build_router(&resources);

        Self {
            resources,
            router,
            media,
            tags_created: AtomicU32::new(0),
        }
    }

    /// Router clone for a single request
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Media directory of this app
    pub fn media_root(&self) -> &std::path::Path {
        self.media.path()
    }

    /// Register through the API and log in
    pub async fn register(&self, username: &str) -> TestUser {
        let email = format!("{username}@example.org");
        AxumTestRequest::post("/api/users/")
            .json(&json!({
                "email": email,
                "username": username,
                "first_name": "Test",
                "last_name": "User",
                "password": TEST_PASSWORD,
            }))
            .send(self.router())
            .await
            .assert_status(StatusCode::CREATED);

        let token = self.login(&email, TEST_PASSWORD).await;
        let user = self
            .resources
            .database
            .users()
            .get_by_email(&email)
            .await
            .unwrap()
            .unwrap();

        TestUser {
            id: user.id,
            email,
            token,
        }
    }

    /// Create an administrator directly in the database and log in
    pub async fn admin(&self) -> TestUser {
        let email = "root@example.org".to_owned();
        let password_hash = self
            .resources
            .auth_manager
            .hash_password(TEST_PASSWORD.to_owned())
            .await
            .unwrap();
        let user = self
            .resources
            .database
            .users()
            .create(&NewUser {
                email: email.clone(),
                username: "root".to_owned(),
                first_name: "Root".to_owned(),
                last_name: "Admin".to_owned(),
                password_hash,
                role: UserRole::Admin,
            })
            .await
            .unwrap();

        let token = self.login(&email, TEST_PASSWORD).await;
        TestUser {
            id: user.id,
            email,
            token,
        }
    }

    /// Log in and return the auth token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body: Value = AxumTestRequest::post("/api/auth/token/login/")
            .json(&json!({ "email": email, "password": password }))
            .send(self.router())
            .await
            .assert_status(StatusCode::OK)
            .json();
        body["auth_token"].as_str().unwrap().to_owned()
    }

    /// Insert a tag with a color of its own and return its ID
    pub async fn tag(&self, name: &str, slug: &str) -> i64 {
        let sequence = self.tags_created.fetch_add(1, Ordering::Relaxed);
        let tags = self.resources.database.tags();
        tags.insert_if_absent(&NewTag {
            name: name.to_owned(),
            color: format!("#{:06X}", 0x00E2_6C2D + sequence * 0x0101),
            slug: slug.to_owned(),
        })
        .await
        .unwrap();
        tags.list()
            .await
            .unwrap()
            .into_iter()
            .find(|tag| tag.slug == slug)
            .unwrap()
            .id
    }

    /// Insert an ingredient and return its ID
    pub async fn ingredient(&self, name: &str, unit: &str) -> i64 {
        let ingredients = self.resources.database.ingredients();
        ingredients
            .insert_if_absent(&NewIngredient {
                name: name.to_owned(),
                measurement_unit: unit.to_owned(),
            })
            .await
            .unwrap();
        ingredients
            .search(Some(name))
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.name == name && i.measurement_unit == unit)
            .unwrap()
            .id
    }

    /// Publish a recipe through the API and return its JSON representation
    pub async fn recipe(
        &self,
        author: &TestUser,
        name: &str,
        ingredients: &[(i64, i64)],
        tags: &[i64],
    ) -> Value {
        let ingredients: Vec<Value> = ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect();

        AxumTestRequest::post("/api/recipes/")
            .token(&author.token)
            .json(&json!({
                "ingredients": ingredients,
                "tags": tags,
                "image": PIXEL_PNG,
                "name": name,
                "text": "Mix everything and bake.",
                "cooking_time": 25,
            }))
            .send(self.router())
            .await
            .assert_status(StatusCode::CREATED)
            .json()
    }
}
