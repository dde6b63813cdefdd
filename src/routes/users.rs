// ABOUTME: Route handlers for user accounts and author subscriptions
// ABOUTME: Registration, profiles, password change, follow/unfollow and the subscriptions feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! User routes
//!
//! Listing and profiles are public; `me`, `set_password` and everything
//! subscription related requires a token.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::recipes::ShortRecipeResponse;
use super::{page_params, parse_number, query_pairs};
use crate::{
    auth::AuthResult,
    errors::{AppError, AppResult, ErrorCode},
    logging::AppLogger,
    models::{validation, NewUser, RegisterRequest, User, UserRole},
    pagination::Page,
    resources::ServerResources,
};

// ============================================================================
// Request / Response Types
// ============================================================================

/// Public user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Email
    pub email: String,
    /// User ID
    pub id: i64,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the requesting user follows this user
    pub is_subscribed: bool,
}

impl UserResponse {
    /// Build the representation as seen by `viewer`
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription lookup fails
    pub async fn for_viewer(
        user: User,
        viewer: Option<i64>,
        resources: &ServerResources,
    ) -> AppResult<Self> {
        let is_subscribed = match viewer {
            Some(viewer_id) if viewer_id != user.id => {
                resources
                    .database
                    .subscriptions()
                    .is_subscribed(viewer_id, user.id)
                    .await?
            }
            _ => false,
        };

        Ok(Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        })
    }
}

/// Response to a successful registration
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUserResponse {
    /// Email
    pub email: String,
    /// User ID
    pub id: i64,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Followed author with their latest recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    /// Author representation
    #[serde(flatten)]
    pub user: UserResponse,
    /// Latest recipes, possibly truncated by `recipes_limit`
    pub recipes: Vec<ShortRecipeResponse>,
    /// Total number of recipes by the author
    pub recipes_count: u64,
}

/// `POST /api/users/set_password/` body
#[derive(Debug, Deserialize, Serialize)]
pub struct SetPasswordRequest {
    /// Current password
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
}

// ============================================================================
// Routes
// ============================================================================

/// User routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/users/",
                get(Self::handle_list_users).post(Self::handle_register),
            )
            .route("/api/users/me/", get(Self::handle_me))
            .route("/api/users/set_password/", post(Self::handle_set_password))
            .route("/api/users/subscriptions/", get(Self::handle_subscriptions))
            .route("/api/users/:id/", get(Self::handle_get_user))
            .route(
                "/api/users/:id/subscribe/",
                post(Self::handle_subscribe).delete(Self::handle_unsubscribe),
            )
            .with_state(resources)
    }

    async fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        resources.auth_middleware.authenticate_request(headers).await
    }

    /// Parse the optional `recipes_limit` query parameter
    fn recipes_limit(uri: &Uri) -> AppResult<Option<u32>> {
        query_pairs(uri.query())
            .into_iter()
            .find(|(key, _)| key == "recipes_limit")
            .map(|(_, value)| parse_number("recipes_limit", &value))
            .transpose()
    }

    /// Build the subscription representation of an author
    async fn subscription_response(
        author: User,
        viewer: i64,
        recipes_limit: Option<u32>,
        resources: &ServerResources,
    ) -> AppResult<SubscriptionResponse> {
        let recipe_manager = resources.database.recipes();
        let recipes = recipe_manager
            .by_author(author.id, recipes_limit)
            .await?
            .into_iter()
            .map(|recipe| ShortRecipeResponse::new(recipe, &resources.media))
            .collect();
        let recipes_count = recipe_manager.count_by_author(author.id).await?;

        Ok(SubscriptionResponse {
            user: UserResponse::for_viewer(author, Some(viewer), resources).await?,
            recipes,
            recipes_count,
        })
    }

    async fn find_user(resources: &ServerResources, id: i64) -> AppResult<User> {
        resources
            .database
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id}")))
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Handle POST /api/users/ - Register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let registration = body.validate()?;
        let password_hash = resources.auth_manager.hash_password(body.password).await?;

        let user = resources
            .database
            .users()
            .create(&NewUser {
                email: registration.email,
                username: registration.username,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password_hash,
                role: UserRole::User,
            })
            .await?;

        info!(user.id = user.id, "User registered");
        AppLogger::log_auth_event(Some(user.id), "register", true);

        let response: RegisteredUserResponse = user.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/users/ - List users
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
    ) -> Result<Response, AppError> {
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?
            .map(|auth| auth.user_id());
        let params = page_params(uri.query(), &resources)?;

        let (users, count) = resources.database.users().list(&params).await?;
        let mut results = Vec::with_capacity(users.len());
        for user in users {
            results.push(UserResponse::for_viewer(user, viewer, &resources).await?);
        }

        let page = Page::new(results, count, params, uri.path(), uri.query())?;
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle GET /api/users/:id/ - User profile
    async fn handle_get_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let viewer = resources
            .auth_middleware
            .authenticate_optional(&headers)
            .await?
            .map(|auth| auth.user_id());
        let user = Self::find_user(&resources, id).await?;

        let response = UserResponse::for_viewer(user, viewer, &resources).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/users/me/ - Current user
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let viewer = auth.user_id();

        let response = UserResponse::for_viewer(auth.user, Some(viewer), &resources).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/users/set_password/ - Change password
    async fn handle_set_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;

        let current_ok = resources
            .auth_manager
            .verify_password(body.current_password, auth.user.password_hash.clone())
            .await?;
        if !current_ok {
            AppLogger::log_auth_event(Some(auth.user_id()), "set_password", false);
            return Err(AppError::field(
                ErrorCode::InvalidInput,
                "current_password",
                "Current password is incorrect",
            ));
        }

        validation::password("new_password", &body.new_password)?;
        let password_hash = resources
            .auth_manager
            .hash_password(body.new_password)
            .await?;
        resources
            .database
            .users()
            .set_password(auth.user_id(), &password_hash)
            .await?;

        AppLogger::log_auth_event(Some(auth.user_id()), "set_password", true);
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Handle GET /api/users/subscriptions/ - Followed authors
    async fn handle_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let params = page_params(uri.query(), &resources)?;
        let recipes_limit = Self::recipes_limit(&uri)?;

        let (authors, count) = resources
            .database
            .subscriptions()
            .authors(auth.user_id(), &params)
            .await?;

        let mut results = Vec::with_capacity(authors.len());
        for author in authors {
            results.push(
                Self::subscription_response(author, auth.user_id(), recipes_limit, &resources)
                    .await?,
            );
        }

        let page = Page::new(results, count, params, uri.path(), uri.query())?;
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle POST /api/users/:id/subscribe/ - Follow an author
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(author_id): Path<i64>,
        uri: Uri,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let author = Self::find_user(&resources, author_id).await?;

        if author.id == auth.user_id() {
            return Err(AppError::invalid_input("You cannot subscribe to yourself"));
        }

        let created = resources
            .database
            .subscriptions()
            .subscribe(auth.user_id(), author.id)
            .await?;
        if !created {
            return Err(AppError::invalid_input(format!(
                "You are already subscribed to {}",
                author.username
            )));
        }

        info!(user.id = auth.user_id(), author.id = author.id, "Subscribed");
        let recipes_limit = Self::recipes_limit(&uri)?;
        let response =
            Self::subscription_response(author, auth.user_id(), recipes_limit, &resources).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe/ - Unfollow an author
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(author_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        let author = Self::find_user(&resources, author_id).await?;

        let removed = resources
            .database
            .subscriptions()
            .unsubscribe(auth.user_id(), author.id)
            .await?;
        if !removed {
            return Err(AppError::not_found(format!(
                "Subscription to {}",
                author.username
            )));
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
