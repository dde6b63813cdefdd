// ABOUTME: Token authentication route handlers
// ABOUTME: Email/password login issuing an auth token, and logout revoking it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! Authentication routes
//!
//! `POST /api/auth/token/login/` exchanges credentials for a token,
//! `POST /api/auth/token/logout/` revokes the presented token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, logging::AppLogger, resources::ServerResources};

/// Login request body
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Login response body
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    /// Token to send as `Authorization: Token <auth_token>`
    pub auth_token: String,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/token/login/", post(Self::handle_login))
            .route("/api/auth/token/logout/", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Handle POST /api/auth/token/login/
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        // One message for every failure so accounts cannot be probed
        let rejected = || AppError::invalid_input("Unable to log in with provided credentials");

        let Some(user) = resources.database.users().get_by_email(&body.email).await? else {
            AppLogger::log_auth_event(None, "login", false);
            return Err(rejected());
        };

        let password_ok = resources
            .auth_manager
            .verify_password(body.password, user.password_hash.clone())
            .await?;
        if !password_ok || !user.is_active {
            AppLogger::log_auth_event(Some(user.id), "login", false);
            return Err(rejected());
        }

        let issued = resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(Some(user.id), "login", true);

        Ok((
            StatusCode::OK,
            Json(LoginResponse {
                auth_token: issued.token,
            }),
        )
            .into_response())
    }

    /// Handle POST /api/auth/token/logout/
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources
            .auth_middleware
            .authenticate_request(&headers)
            .await?;

        let revoked = resources.database.revoked_tokens();
        revoked
            .revoke(&auth.token_id, auth.user_id(), auth.expires_at)
            .await?;
        let purged = revoked.purge_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "Purged expired token revocations");
        }

        AppLogger::log_auth_event(Some(auth.user_id()), "logout", true);
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
