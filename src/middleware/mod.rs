// ABOUTME: HTTP middleware for authentication and cross-origin policy
// ABOUTME: Token authentication of API requests and the CORS layer built from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

/// Token authentication for protected and optionally-authenticated routes
pub mod auth;
/// CORS layer built from the configured allowed origins
pub mod cors;

// Authentication middleware
pub use auth::AuthMiddleware;

// CORS configuration
pub use cors::setup_cors;
