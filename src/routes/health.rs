// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports service status and version after pinging the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::resources::ServerResources;

/// Health check body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    /// Service version
    pub version: String,
    /// Check time
    pub timestamp: String,
}

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    /// Handle GET /health
    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> impl IntoResponse {
        let (status, code) = match resources.database.ping().await {
            Ok(()) => ("ok", StatusCode::OK),
            Err(e) => {
                tracing::error!("Health check failed: {e}");
                ("degraded", StatusCode::SERVICE_UNAVAILABLE)
            }
        };

        (
            code,
            Json(HealthResponse {
                status: status.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }),
        )
    }
}
