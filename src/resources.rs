// ABOUTME: Centralized resource container for dependency injection into route handlers
// ABOUTME: Holds the database, auth manager, auth middleware, media store and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! # Server Resources
//!
//! Shared, immutable state handed to every router through `State`. Built
//! once at startup; handlers only clone the outer `Arc`.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::media::MediaStore;
use crate::middleware::AuthMiddleware;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Arc<Database>,
    /// Token issuing and password hashing
    pub auth_manager: Arc<AuthManager>,
    /// Request authentication
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Uploaded image storage
    pub media: Arc<MediaStore>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(&config.auth));
        let auth_middleware = Arc::new(AuthMiddleware::new(
            Arc::clone(&auth_manager),
            Arc::clone(&database),
        ));
        let media = Arc::new(MediaStore::new(&config.media));

        Self {
            database,
            auth_manager,
            auth_middleware,
            media,
            config: Arc::new(config),
        }
    }
}
