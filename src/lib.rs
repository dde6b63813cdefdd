// ABOUTME: Main library entry point for the Foodgram recipe-sharing API
// ABOUTME: Users, recipes, favorites, subscriptions and shopping-list downloads over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

#![deny(unsafe_code)]

//! # Foodgram Server
//!
//! A REST API where users publish recipes, follow authors, keep favorites and
//! collect recipes into a shopping cart that can be downloaded as a single
//! aggregated ingredient list.
//!
//! ## Architecture
//!
//! - **Models**: domain types and request validation
//! - **Database**: `SQLite` storage, one manager per aggregate
//! - **Services**: shopping-list aggregation and rendering
//! - **Routes**: axum handlers, one route struct per resource
//! - **Server**: router assembly and the tower-http middleware stack
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use foodgram_server::{config::ServerConfig, database::Database, resources::ServerResources, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Database::new(&config.database_url).await?;
//!     let resources = Arc::new(ServerResources::new(database, config));
//!     server::run(resources).await
//! }
//! ```

/// Token issuing, validation and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// `SQLite` storage layer
pub mod database;

/// Error types (re-exported from `foodgram-core`)
pub mod errors;

/// Logging setup and structured event helpers
pub mod logging;

/// Recipe image storage
pub mod media;

/// Request authentication and CORS
pub mod middleware;

/// Domain models and validation
pub mod models;

/// Page-number pagination (re-exported from `foodgram-core`)
pub mod pagination;

/// Shared state handed to the routers
pub mod resources;

/// REST route handlers
pub mod routes;

/// Router assembly and serving
pub mod server;

/// Business logic that sits between routes and storage
pub mod services;

pub use foodgram_core::constants;
