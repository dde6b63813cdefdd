// ABOUTME: Route handlers for recipe tags
// ABOUTME: Public read-only listing and lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::{errors::AppError, resources::ServerResources};

/// Tag routes handler
pub struct TagRoutes;

impl TagRoutes {
    /// Create all tag routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tags/", get(Self::handle_list))
            .route("/api/tags/:id/", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/tags/
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let tags = resources.database.tags().list().await?;
        Ok((StatusCode::OK, Json(tags)).into_response())
    }

    /// Handle GET /api/tags/:id/
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let tag = resources
            .database
            .tags()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tag {id}")))?;
        Ok((StatusCode::OK, Json(tag)).into_response())
    }
}
