// ABOUTME: HTTP server assembly: merges the route groups and wires the tower-http middleware stack
// ABOUTME: Request tracing, request IDs, CORS, body limits, timeouts, media files and graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{body::Body, extract::DefaultBodyLimit, http::Request, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    middleware::setup_cors,
    resources::ServerResources,
    routes::{AuthRoutes, HealthRoutes, IngredientRoutes, RecipeRoutes, TagRoutes, UserRoutes},
};

/// Upper bound for a single request, image upload included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the complete application router
#[allow(deprecated)]
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let config = &resources.config;

    let api = Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(AuthRoutes::routes(Arc::clone(resources)))
        .merge(UserRoutes::routes(Arc::clone(resources)))
        .merge(TagRoutes::routes(Arc::clone(resources)))
        .merge(IngredientRoutes::routes(Arc::clone(resources)))
        .merge(RecipeRoutes::routes(Arc::clone(resources)));

    let media_files = ServeDir::new(&config.media.root);
    let media_mount = config.media.url_prefix.trim_end_matches('/');
    let app = if media_mount.is_empty() {
        api.fallback_service(media_files)
    } else {
        api.nest_service(media_mount, media_files)
    };

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(setup_cors(&config.http))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(DefaultBodyLimit::max(config.http.max_body_bytes)),
    )
}

/// Bind the configured address and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let address = format!(
        "{}:{}",
        resources.config.http.host, resources.config.http.port
    );
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    serve(listener, resources).await
}

/// Serve on an already bound listener
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections
pub async fn serve(listener: TcpListener, resources: Arc<ServerResources>) -> Result<()> {
    let local = listener.local_addr().context("Listener has no local address")?;
    let app = build_router(&resources);

    info!(address = %local, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
